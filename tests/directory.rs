mod common;

use collabhub::{
    AppError,
    projects::{NewProject, ProjectPatch, create_project, get_project, list_projects, update_project},
    users::{NewUser, ProfilePatch, get_user, register, update_profile},
};
use uuid::Uuid;

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_owned(),
        email: email.to_owned(),
        password: "secret".to_owned(),
        college: Some("  State U ".to_owned()),
        skills: vec!["rust".to_owned(), " rust".to_owned(), "sql".to_owned(), " ".to_owned()],
        interests: None,
        bio: Some("   ".to_owned()),
        profile_url: None,
    }
}

#[tokio::test]
async fn registration_normalizes_profile_fields() {
    let store = common::store().await;
    let user = register(&store, new_user(" Ada ", "ada@example.com")).await.unwrap();

    assert_eq!(user.name, "Ada");
    assert_eq!(user.college.as_deref(), Some("State U"));
    assert_eq!(user.bio, None);
    assert_eq!(user.skills.0.iter().collect::<Vec<_>>(), vec!["rust", "sql"]);

    let fetched = get_user(&store, user.id).await.unwrap();
    assert_eq!(fetched.email, "ada@example.com");
    assert_eq!(fetched.skills.0, user.skills.0);
}

#[tokio::test]
async fn email_is_unique_ignoring_case() {
    let store = common::store().await;
    register(&store, new_user("Ada", "ada@example.com")).await.unwrap();

    let err = register(&store, new_user("Imposter", "ADA@Example.COM")).await.unwrap_err();
    assert!(matches!(err, AppError::EmailTaken), "got {err:?}");
    assert_eq!(common::count(&store, "users").await, 1);
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let store = common::store().await;

    let err = register(&store, new_user("  ", "x@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");

    let err = register(&store, new_user("Ada", "not-an-email")).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");
}

#[tokio::test]
async fn profile_patch_touches_only_given_fields() {
    let store = common::store().await;
    let user = register(&store, new_user("Ada", "ada@example.com")).await.unwrap();

    let updated = update_profile(
        &store,
        user.id,
        ProfilePatch {
            bio: Some("Builds compilers".to_owned()),
            skills: Some(vec!["ocaml".to_owned()]),
            ..ProfilePatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Ada");
    assert_eq!(updated.college.as_deref(), Some("State U"));
    assert_eq!(updated.bio.as_deref(), Some("Builds compilers"));
    assert_eq!(updated.skills.0.iter().collect::<Vec<_>>(), vec!["ocaml"]);

    let cleared = update_profile(
        &store,
        user.id,
        ProfilePatch {
            college: Some(String::new()),
            ..ProfilePatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.college, None);
    assert_eq!(cleared.bio.as_deref(), Some("Builds compilers"));

    let err = update_profile(&store, Uuid::now_v7(), ProfilePatch::default()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("user")), "got {err:?}");

    let err = update_profile(
        &store,
        user.id,
        ProfilePatch {
            name: Some(" ".to_owned()),
            ..ProfilePatch::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");
}

#[tokio::test]
async fn project_needs_an_existing_owner_and_a_title() {
    let store = common::store().await;
    let owner = common::user(&store, "Olive").await;

    let err = create_project(
        &store,
        NewProject {
            owner_id: Uuid::now_v7(),
            title: "Ghost".to_owned(),
            description: String::new(),
            skills_needed: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("user")), "got {err:?}");

    let err = create_project(
        &store,
        NewProject {
            owner_id: owner.id,
            title: "   ".to_owned(),
            description: String::new(),
            skills_needed: vec![],
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");
}

#[tokio::test]
async fn projects_are_listed_per_owner_in_creation_order() {
    let store = common::store().await;
    let olive = common::user(&store, "Olive").await;
    let pat = common::user(&store, "Pat").await;
    let a = common::project(&store, &olive, "A").await;
    let b = common::project(&store, &pat, "B").await;
    let c = common::project(&store, &olive, "C").await;

    let all: Vec<_> = list_projects(&store, None).await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(all, vec![a.id, b.id, c.id]);

    let olives: Vec<_> = list_projects(&store, Some(olive.id))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(olives, vec![a.id, c.id]);
}

#[tokio::test]
async fn only_owner_edits_a_project() {
    let store = common::store().await;
    let olive = common::user(&store, "Olive").await;
    let pat = common::user(&store, "Pat").await;
    let project = common::project(&store, &olive, "Compiler").await;

    let patch = || ProjectPatch {
        title: Some("Optimizing compiler".to_owned()),
        ..ProjectPatch::default()
    };

    let err = update_project(&store, project.id, pat.id, patch()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden), "got {err:?}");
    assert_eq!(get_project(&store, project.id).await.unwrap().title, "Compiler");

    let updated = update_project(&store, project.id, olive.id, patch()).await.unwrap();
    assert_eq!(updated.title, "Optimizing compiler");
    assert_eq!(updated.skills_needed.0, project.skills_needed.0);
}
