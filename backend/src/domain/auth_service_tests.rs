//! Tests for the authentication service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockCredentialHasher, MockTokenIssuer, MockUserRepository};
use crate::test_support::FixedClock;

type TestService = AuthService<MockUserRepository, MockCredentialHasher, MockTokenIssuer>;

fn make_service(
    users: MockUserRepository,
    hasher: MockCredentialHasher,
    tokens: MockTokenIssuer,
) -> TestService {
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    AuthService::new(
        Arc::new(users),
        Arc::new(hasher),
        Arc::new(tokens),
        Arc::new(clock),
    )
}

fn stored_user(username: &str) -> User {
    User {
        id: UserId::random(),
        username: username.to_owned(),
        password_hash: "$argon2id$stored".to_owned(),
        points: 40,
        referrer_id: None,
        created_at: Utc::now(),
    }
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("ada", password).expect("valid credentials")
}

fn token_issuer_expecting(id: Option<UserId>) -> MockTokenIssuer {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .withf(move |user| id.is_none_or(|expected| *user == expected))
        .times(1)
        .returning(|user| Ok(format!("token-for-{user}")));
    tokens
}

#[tokio::test]
async fn unknown_username_registers_user_with_hashed_password() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    users
        .expect_create()
        .withf(|new_user| {
            new_user.username == "ada"
                && new_user.password_hash == "hashed:secret"
                && new_user.created_at == Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        })
        .times(1)
        .returning(|new_user| Ok(new_user.clone().into_user()));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|password| Ok(format!("hashed:{password}")));
    hasher.expect_verify().never();

    let service = make_service(users, hasher, token_issuer_expecting(None));
    let session = service
        .authenticate(&RequestContext::detached(), &credentials("secret"))
        .await
        .expect("registration succeeds");

    assert_eq!(session.token, format!("token-for-{}", session.user_id));
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::InvalidCredentials))]
#[tokio::test]
async fn known_username_requires_matching_password(
    #[case] password_matches: bool,
    #[case] expected_error: Option<ErrorCode>,
) {
    let existing = stored_user("ada");
    let existing_id = existing.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    users.expect_create().never();
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_hash().never();
    hasher
        .expect_verify()
        .withf(|password, hash| password == "secret" && hash == "$argon2id$stored")
        .times(1)
        .return_once(move |_, _| Ok(password_matches));
    let tokens = if password_matches {
        token_issuer_expecting(Some(existing_id))
    } else {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue().never();
        tokens
    };

    let service = make_service(users, hasher, tokens);
    let result = service
        .authenticate(&RequestContext::detached(), &credentials("secret"))
        .await;

    match expected_error {
        None => assert_eq!(result.expect("login succeeds").user_id, existing_id),
        Some(code) => assert_eq!(result.expect_err("login fails").code(), code),
    }
}

#[tokio::test]
async fn registration_race_authenticates_against_winning_row() {
    let winner = stored_user("ada");
    let winner_id = winner.id;
    let mut users = MockUserRepository::new();
    let mut lookups = 0_u8;
    users
        .expect_find_by_username()
        .times(2)
        .returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
    users
        .expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_username("ada")));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok("hashed".to_owned()));
    hasher.expect_verify().times(1).return_once(|_, _| Ok(true));

    let service = make_service(users, hasher, token_issuer_expecting(Some(winner_id)));
    let session = service
        .authenticate(&RequestContext::detached(), &credentials("secret"))
        .await
        .expect("login after race succeeds");

    assert_eq!(session.user_id, winner_id);
}

#[tokio::test]
async fn storage_failure_during_registration_surfaces_as_internal() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(None));
    users
        .expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("pool timed out")));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok("hashed".to_owned()));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let service = make_service(users, hasher, tokens);
    let err = service
        .authenticate(&RequestContext::detached(), &credentials("secret"))
        .await
        .expect_err("storage failure propagates");

    assert_eq!(err.code(), ErrorCode::InternalError);
}
