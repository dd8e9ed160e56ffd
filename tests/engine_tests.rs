//! Integration tests for owner-scoped operations and the completion transition.

use chrono::NaiveDate;
use std::sync::Arc;
use taskflow::analytics::{
    ACTION_TASK_COMPLETED, AnalyticsRecorder, DbAnalyticsRecorder, RecordError, TaskCompleted,
};
use taskflow::config::StatsConfig;
use taskflow::db::Database;
use taskflow::db::scope::TaskFilter;
use taskflow::engine::{AssignRequest, Engine};
use taskflow::error::ErrorCode;
use taskflow::types::{
    AnalyticsRecord, NewProject, NewSprint, NewTask, ProfilePatch, Project, ProjectPatch,
    SprintPatch, Task, TaskPatch, TaskStatus, User, UserId, UserProfile,
};

struct Fixture {
    db: Arc<Database>,
    engine: Engine,
}

fn setup() -> Fixture {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create in-memory database"));
    let recorder = Arc::new(DbAnalyticsRecorder::new(Arc::clone(&db)));
    let engine = Engine::new(Arc::clone(&db), recorder, StatsConfig::default());
    Fixture { db, engine }
}

/// Recorder whose storage is always down.
struct BrokenRecorder;

impl AnalyticsRecorder for BrokenRecorder {
    fn record_task_completed(
        &self,
        _user: UserId,
        _event: &TaskCompleted,
    ) -> Result<AnalyticsRecord, RecordError> {
        Err(RecordError::Storage(anyhow::anyhow!("analytics store offline")))
    }
}

impl Fixture {
    fn user(&self, name: &str) -> (User, UserProfile) {
        self.db.create_user(name, false).expect("Failed to create user")
    }

    fn project(&self, owner: &User, name: &str) -> Project {
        self.engine
            .create_project(
                owner,
                NewProject {
                    name: name.to_string(),
                    color: None,
                },
            )
            .expect("Failed to create project")
    }

    fn task(&self, owner: &User, project: &Project, title: &str) -> Task {
        self.engine
            .create_task(
                owner,
                NewTask {
                    title: title.to_string(),
                    project: Some(project.id),
                    status: Some(TaskStatus::Todo),
                    ..Default::default()
                },
            )
            .expect("Failed to create task")
    }

    fn set_status(&self, owner: &User, task: &Task, status: TaskStatus) -> Task {
        self.engine
            .update_task(
                owner,
                task.id,
                TaskPatch {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .expect("Failed to update task")
    }

    fn completion_events(&self, task: &Task) -> usize {
        self.db
            .analytics_for_task(ACTION_TASK_COMPLETED, task.id)
            .unwrap()
            .len()
    }
}

mod completion_tests {
    use super::*;

    #[test]
    fn todo_to_done_stamps_and_records_once() {
        let fx = setup();
        let (u1, profile) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");
        assert!(t1.completed_at.is_none());

        let done = fx.set_status(&u1, &t1, TaskStatus::Done);

        assert!(done.completed);
        assert!(done.completed_at.is_some());
        let records = fx.db.analytics_for_profile(profile.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, "task_completed");
        let details = records[0].details.as_ref().unwrap();
        assert_eq!(details["task_id"], t1.id);
        assert_eq!(details["title"], "T1");
        assert_eq!(details["project_id"], p1.id);
    }

    #[test]
    fn done_to_done_is_not_a_transition() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let first = fx.set_status(&u1, &t1, TaskStatus::Done);
        let again = fx
            .engine
            .update_task(
                &u1,
                t1.id,
                TaskPatch {
                    status: Some(TaskStatus::Done),
                    completed: Some(true),
                    title: Some("T1 renamed".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(again.completed_at, first.completed_at);
        assert_eq!(fx.completion_events(&t1), 1);
    }

    #[test]
    fn reopen_and_finish_again_keeps_first_completion() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let first = fx.set_status(&u1, &t1, TaskStatus::Done);
        let reopened = fx.set_status(&u1, &t1, TaskStatus::Todo);
        assert!(!reopened.completed);
        assert_eq!(reopened.completed_at, first.completed_at);

        let second = fx.set_status(&u1, &t1, TaskStatus::Done);
        assert_eq!(second.completed_at, first.completed_at);
        assert_eq!(fx.completion_events(&t1), 1);
    }

    #[test]
    fn completed_flag_alone_completes_the_task() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let done = fx
            .engine
            .update_task(
                &u1,
                t1.id,
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(done.status, TaskStatus::Done);
        assert!(done.completed_at.is_some());
        assert_eq!(fx.completion_events(&t1), 1);
    }

    #[test]
    fn status_and_completed_always_agree() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let patches = [
            TaskPatch { status: Some(TaskStatus::Progress), ..Default::default() },
            TaskPatch { completed: Some(true), ..Default::default() },
            TaskPatch { completed: Some(false), ..Default::default() },
            TaskPatch { status: Some(TaskStatus::Review), completed: Some(true), ..Default::default() },
            TaskPatch { status: Some(TaskStatus::Done), completed: Some(false), ..Default::default() },
            TaskPatch { title: Some("renamed".into()), ..Default::default() },
        ];
        for patch in patches {
            let task = fx.engine.update_task(&u1, t1.id, patch).unwrap();
            assert_eq!(task.status == TaskStatus::Done, task.completed, "{:?}", task.status);
        }
    }

    #[test]
    fn creating_a_done_task_counts_as_completion() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");

        let task = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "already done".into(),
                    project: Some(p1.id),
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(task.completed);
        assert!(task.completed_at.is_some());
        assert_eq!(fx.completion_events(&task), 1);
    }

    #[test]
    fn analytics_failure_does_not_fail_the_update() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let engine = Engine::new(Arc::clone(&db), Arc::new(BrokenRecorder), StatsConfig::default());
        let (u1, _) = db.create_user("u1", false).unwrap();
        let p1 = engine
            .create_project(&u1, NewProject { name: "P1".into(), color: None })
            .unwrap();
        let t1 = engine
            .create_task(
                &u1,
                NewTask {
                    title: "T1".into(),
                    project: Some(p1.id),
                    ..Default::default()
                },
            )
            .unwrap();

        let done = engine
            .update_task(
                &u1,
                t1.id,
                TaskPatch {
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(done.completed_at.is_some());
        assert!(db.analytics_for_task(ACTION_TASK_COMPLETED, t1.id).unwrap().is_empty());
    }
}

mod isolation_tests {
    use super::*;

    #[test]
    fn other_users_objects_are_not_found() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");
        let s1 = fx
            .engine
            .create_sprint(
                &u1,
                NewSprint {
                    name: "S1".into(),
                    project: Some(p1.id),
                    ..Default::default()
                },
            )
            .unwrap();

        let not_found = |code: ErrorCode| assert_eq!(code, ErrorCode::NotFound);

        not_found(fx.engine.get_task(&u2, t1.id).unwrap_err().code);
        not_found(fx.engine.get_project(&u2, p1.id).unwrap_err().code);
        not_found(fx.engine.get_sprint(&u2, s1.id).unwrap_err().code);
        not_found(
            fx.engine
                .update_task(&u2, t1.id, TaskPatch { title: Some("x".into()), ..Default::default() })
                .unwrap_err()
                .code,
        );
        not_found(
            fx.engine
                .update_project(&u2, p1.id, ProjectPatch { name: Some("x".into()), color: None })
                .unwrap_err()
                .code,
        );
        not_found(
            fx.engine
                .update_sprint(&u2, s1.id, SprintPatch::default())
                .unwrap_err()
                .code,
        );
        not_found(fx.engine.delete_task(&u2, t1.id).unwrap_err().code);
        not_found(fx.engine.delete_sprint(&u2, s1.id).unwrap_err().code);
        not_found(fx.engine.delete_project(&u2, p1.id).unwrap_err().code);

        assert!(fx.engine.list_projects(&u2).unwrap().is_empty());
        assert!(fx.engine.list_sprints(&u2).unwrap().is_empty());
        assert!(fx.engine.list_tasks(&u2, &TaskFilter::default()).unwrap().is_empty());

        // Still intact for the owner
        assert_eq!(fx.engine.get_task(&u1, t1.id).unwrap().title, "T1");
    }

    #[test]
    fn task_in_foreign_project_is_denied() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");

        let err = fx
            .engine
            .create_task(
                &u2,
                NewTask {
                    title: "intruder".into(),
                    project: Some(p1.id),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let err = fx
            .engine
            .create_sprint(
                &u2,
                NewSprint {
                    name: "intruder".into(),
                    project: Some(p1.id),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn moving_a_task_into_a_foreign_project_is_denied() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u2, "P2");
        let t1 = fx.task(&u1, &p1, "T1");

        let err = fx
            .engine
            .update_task(&u1, t1.id, TaskPatch { project: Some(p2.id), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(fx.engine.get_task(&u1, t1.id).unwrap().project, Some(p1.id));
    }

    #[test]
    fn missing_or_unknown_project_is_a_validation_error() {
        let fx = setup();
        let (u1, _) = fx.user("u1");

        let missing = fx
            .engine
            .create_task(&u1, NewTask { title: "t".into(), ..Default::default() })
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::ValidationError);
        assert_eq!(missing.field.as_deref(), Some("project"));

        let unknown = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "t".into(),
                    project: Some(999),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(unknown.code, ErrorCode::ValidationError);
    }
}

mod sprint_consistency_tests {
    use super::*;

    fn sprint_in(fx: &Fixture, owner: &User, project: &Project) -> i64 {
        fx.engine
            .create_sprint(
                owner,
                NewSprint {
                    name: format!("{} sprint", project.name),
                    project: Some(project.id),
                    ..Default::default()
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn create_with_sprint_of_other_project_is_denied() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u1, "P2");
        let s2 = sprint_in(&fx, &u1, &p2);

        let err = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "t".into(),
                    project: Some(p1.id),
                    sprint: Some(s2),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.field.as_deref(), Some("sprint"));
    }

    #[test]
    fn update_with_sprint_of_other_project_is_denied() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u1, "P2");
        let s2 = sprint_in(&fx, &u1, &p2);
        let t1 = fx.task(&u1, &p1, "T1");

        let err = fx
            .engine
            .update_task(&u1, t1.id, TaskPatch { sprint: Some(Some(s2)), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn moving_project_and_sprint_together_is_allowed() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u1, "P2");
        let s2 = sprint_in(&fx, &u1, &p2);
        let t1 = fx.task(&u1, &p1, "T1");

        let moved = fx
            .engine
            .update_task(
                &u1,
                t1.id,
                TaskPatch {
                    project: Some(p2.id),
                    sprint: Some(Some(s2)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.project, Some(p2.id));
        assert_eq!(moved.sprint, Some(s2));
    }

    #[test]
    fn moving_project_keeps_stale_sprint_out() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u1, "P2");
        let s1 = sprint_in(&fx, &u1, &p1);
        let t1 = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "T1".into(),
                    project: Some(p1.id),
                    sprint: Some(s1),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = fx
            .engine
            .update_task(&u1, t1.id, TaskPatch { project: Some(p2.id), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let moved = fx
            .engine
            .update_task(
                &u1,
                t1.id,
                TaskPatch {
                    project: Some(p2.id),
                    sprint: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.sprint, None);
    }

    #[test]
    fn sprint_end_before_start_is_rejected() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");

        let err = fx
            .engine
            .create_sprint(
                &u1,
                NewSprint {
                    name: "backwards".into(),
                    project: Some(p1.id),
                    start_date: NaiveDate::from_ymd_opt(2024, 5, 10),
                    end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("end_date"));
    }

    #[test]
    fn sprint_with_tasks_cannot_change_project() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let p2 = fx.project(&u1, "P2");
        let s1 = sprint_in(&fx, &u1, &p1);
        fx.engine
            .create_task(
                &u1,
                NewTask {
                    title: "T1".into(),
                    project: Some(p1.id),
                    sprint: Some(s1),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = fx
            .engine
            .update_sprint(&u1, s1, SprintPatch { project: Some(p2.id), ..Default::default() })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn deleting_sprint_unlinks_tasks() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let s1 = sprint_in(&fx, &u1, &p1);
        let t1 = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "T1".into(),
                    project: Some(p1.id),
                    sprint: Some(s1),
                    ..Default::default()
                },
            )
            .unwrap();

        fx.engine.delete_sprint(&u1, s1).unwrap();
        assert_eq!(fx.engine.get_task(&u1, t1.id).unwrap().sprint, None);
    }
}

mod assign_tests {
    use super::*;

    #[test]
    fn assign_sets_nested_profile() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (_, other_profile) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let task = fx
            .engine
            .assign_task(
                &u1,
                AssignRequest {
                    task_id: Some(t1.id),
                    user_profile_id: Some(other_profile.id),
                },
            )
            .unwrap();
        assert_eq!(task.assigned_to, Some(other_profile));
    }

    #[test]
    fn foreign_task_or_unknown_profile_is_not_found() {
        let fx = setup();
        let (u1, profile) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        let err = fx
            .engine
            .assign_task(
                &u2,
                AssignRequest {
                    task_id: Some(t1.id),
                    user_profile_id: Some(profile.id),
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = fx
            .engine
            .assign_task(
                &u1,
                AssignRequest {
                    task_id: Some(t1.id),
                    user_profile_id: Some(9_999),
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn invalid_assignee_on_create_is_a_validation_error() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");

        let err = fx
            .engine
            .create_task(
                &u1,
                NewTask {
                    title: "t".into(),
                    project: Some(p1.id),
                    assigned_to: Some(9_999),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("assigned_to"));
    }
}

mod stats_tests {
    use super::*;

    #[test]
    fn empty_project_reports_zero_progress() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");

        let stats = fx.engine.project_stats(&u1, Some(p1.id)).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.progress, 0);
        assert_eq!(stats.team_members, 4);
    }

    #[test]
    fn counts_and_progress() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let a = fx.task(&u1, &p1, "a");
        let b = fx.task(&u1, &p1, "b");
        fx.task(&u1, &p1, "c");
        fx.set_status(&u1, &a, TaskStatus::Done);
        fx.set_status(&u1, &b, TaskStatus::Review);

        let stats = fx.engine.project_stats(&u1, Some(p1.id)).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.progress, 33);
    }

    #[test]
    fn missing_or_foreign_project() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");

        assert_eq!(fx.engine.project_stats(&u1, None).unwrap_err().code, ErrorCode::BadRequest);
        assert_eq!(
            fx.engine.project_stats(&u2, Some(p1.id)).unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[test]
    fn team_members_comes_from_config() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let recorder = Arc::new(DbAnalyticsRecorder::new(Arc::clone(&db)));
        let engine = Engine::new(Arc::clone(&db), recorder, StatsConfig { team_members: 9 });
        let (u1, _) = db.create_user("u1", false).unwrap();
        let p1 = engine
            .create_project(&u1, NewProject { name: "P1".into(), color: None })
            .unwrap();

        assert_eq!(engine.project_stats(&u1, Some(p1.id)).unwrap().team_members, 9);
    }
}

mod project_tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let err = fx
            .engine
            .create_project(&u1, NewProject { name: "   ".into(), color: None })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");

        let updated = fx
            .engine
            .update_project(&u1, p1.id, ProjectPatch { name: None, color: Some("bg-danger".into()) })
            .unwrap();
        assert_eq!(updated.name, "P1");
        assert_eq!(updated.color, "bg-danger");
        assert_eq!(fx.engine.get_project(&u1, p1.id).unwrap(), updated);
    }

    #[test]
    fn newest_project_listed_first() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let first = fx.project(&u1, "first");
        let second = fx.project(&u1, "second");

        let ids: Vec<_> = fx.engine.list_projects(&u1).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn delete_removes_tasks() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");

        fx.engine.delete_project(&u1, p1.id).unwrap();
        assert!(fx.db.get_task(t1.id).unwrap().is_none());
    }
}

mod analytics_tests {
    use super::*;

    #[test]
    fn list_is_scoped_to_own_profile() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (u2, _) = fx.user("u2");
        let p1 = fx.project(&u1, "P1");
        let t1 = fx.task(&u1, &p1, "T1");
        fx.set_status(&u1, &t1, TaskStatus::Done);

        assert_eq!(fx.engine.list_analytics(&u1).unwrap().len(), 1);
        assert!(fx.engine.list_analytics(&u2).unwrap().is_empty());
    }
}

mod profile_tests {
    use super::*;

    #[test]
    fn own_profile_is_updated_partially() {
        let fx = setup();
        let (u1, profile) = fx.user("u1");

        let patch = ProfilePatch {
            bio: Some("Backend".to_string()),
            avatar: Some(Some("avatars/u1.png".to_string())),
        };
        let updated = fx.engine.update_profile(&u1, profile.id, patch).unwrap();
        assert_eq!(updated.bio, "Backend");
        assert_eq!(updated.avatar.as_deref(), Some("avatars/u1.png"));

        let cleared = ProfilePatch {
            bio: None,
            avatar: Some(None),
        };
        let updated = fx.engine.update_profile(&u1, profile.id, cleared).unwrap();
        assert_eq!(updated.bio, "Backend");
        assert_eq!(updated.avatar, None);
        assert_eq!(fx.engine.get_profile(&u1, profile.id).unwrap(), updated);
    }

    #[test]
    fn other_profiles_are_not_found_except_for_staff() {
        let fx = setup();
        let (u1, _) = fx.user("u1");
        let (_, other) = fx.user("u2");
        let (admin, _) = fx.db.create_user("admin", true).unwrap();

        let patch = ProfilePatch {
            bio: Some("hijacked".to_string()),
            avatar: None,
        };
        let err = fx.engine.update_profile(&u1, other.id, patch.clone()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(fx.db.get_profile(other.id).unwrap().unwrap().bio, "");

        let updated = fx.engine.update_profile(&admin, other.id, patch).unwrap();
        assert_eq!(updated.bio, "hijacked");
    }
}
