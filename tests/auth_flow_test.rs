mod common;

use clinic_backend::errors::ApiError;
use clinic_backend::services::Action;

/// The bootstrapped admin logs in with the default credentials and the
/// resulting token authorizes Administrator-only operations; a cashier token
/// against the same operation is Forbidden.
#[tokio::test]
async fn login_token_drives_the_authorization_matrix() {
    let app = common::setup_app().await;

    let admin_login = app.auth_service.login("admin", "admin123", None).await.unwrap();
    let resolved = app
        .access
        .require(Some(&admin_login.token), Action::AdministerUsers)
        .await
        .unwrap();
    assert_eq!(resolved.username, "admin");

    let cashier_login = app.auth_service.login("cashier", "cashier123", None).await.unwrap();
    let forbidden = app
        .access
        .require(Some(&cashier_login.token), Action::AdministerUsers)
        .await;
    assert!(matches!(forbidden, Err(ApiError::Forbidden(_))));

    // But the cashier is allowed at the cash desk
    assert!(app
        .access
        .require(Some(&cashier_login.token), Action::RecordPayments)
        .await
        .is_ok());
}

#[tokio::test]
async fn unauthenticated_attempts_are_unauthorized_not_forbidden() {
    let app = common::setup_app().await;

    for action in [
        Action::ManagePatients,
        Action::ManageTickets,
        Action::ManageConsultations,
        Action::RecordPayments,
        Action::AdministerUsers,
    ] {
        let missing = app.access.require(None, action).await;
        assert!(matches!(missing, Err(ApiError::Unauthorized(_))));

        let garbage = app.access.require(Some("not-a-token"), action).await;
        assert!(matches!(garbage, Err(ApiError::Unauthorized(_))));
    }
}

/// Every seeded role attempts every action; the outcome must match the
/// policy table row for row.
#[tokio::test]
async fn every_role_meets_the_policy_table() {
    let app = common::setup_app().await;

    let cases: &[(&str, &str, &[Action])] = &[
        (
            "admin",
            "admin123",
            &[
                Action::ManagePatients,
                Action::ManageTickets,
                Action::ManageConsultations,
                Action::RecordPayments,
                Action::AdministerUsers,
            ],
        ),
        (
            "frontdesk",
            "frontdesk123",
            &[Action::ManagePatients, Action::ManageTickets],
        ),
        (
            "physician",
            "physician123",
            &[Action::ManagePatients, Action::ManageTickets, Action::ManageConsultations],
        ),
        ("cashier", "cashier123", &[Action::RecordPayments]),
    ];

    let all_actions = [
        Action::ManagePatients,
        Action::ManageTickets,
        Action::ManageConsultations,
        Action::RecordPayments,
        Action::AdministerUsers,
    ];

    for (username, password, allowed) in cases {
        let login = app.auth_service.login(username, password, None).await.unwrap();
        for action in all_actions {
            let outcome = app.access.require(Some(&login.token), action).await;
            if allowed.contains(&action) {
                assert!(outcome.is_ok(), "{} should be allowed to {:?}", username, action);
            } else {
                assert!(
                    matches!(outcome, Err(ApiError::Forbidden(_))),
                    "{} should be forbidden to {:?}",
                    username,
                    action
                );
            }
        }
    }
}

#[tokio::test]
async fn disabling_an_account_revokes_live_tokens() {
    let app = common::setup_app().await;

    let login = app.auth_service.login("physician", "physician123", None).await.unwrap();
    assert!(app
        .access
        .require(Some(&login.token), Action::ManageConsultations)
        .await
        .is_ok());

    let physician = app.identity_store.get_by_username("physician").await.unwrap();
    app.user_service
        .set_enabled(&physician.id, false, "admin-test", None)
        .await
        .unwrap();

    let outcome = app
        .access
        .require(Some(&login.token), Action::ManageConsultations)
        .await;
    assert!(matches!(outcome, Err(ApiError::Unauthorized(_))));

    // And a fresh login is rejected outright
    let relogin = app.auth_service.login("physician", "physician123", None).await;
    assert!(matches!(relogin, Err(ApiError::Unauthorized(_))));
}
