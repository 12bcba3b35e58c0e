use schoolhouse_core::SchoolError;
use schoolhouse_core::core::session::SessionPhase;
use schoolhouse_core::core::session::error::SessionError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn test_lockout_cycle_on_disk() {
    let tmp = TempDir::new().unwrap();
    let now = SystemTime::now();
    let mut core = open_core(&tmp, now);

    for expected_remaining in (0..5).rev() {
        let err = core
            .session_mut()
            .attempt(ADMIN, &secret("wrong"), now)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidCredentials { attempts_remaining } if attempts_remaining == expected_remaining
        ));
    }

    // correct password is refused while locked
    let locked = core
        .session_mut()
        .attempt(ADMIN, &secret(PASSWORD), now + Duration::from_secs(1))
        .unwrap_err();
    assert!(matches!(
        locked,
        SessionError::LockedOut { remaining_secs: 19 }
    ));

    let after = now + Duration::from_secs(20);
    assert_eq!(core.session().phase(after), SessionPhase::Anonymous);
    assert!(
        core.session_mut()
            .login(ADMIN, &secret(PASSWORD), after)
            .unwrap()
    );
    assert_eq!(core.session().failed_attempts(), 0);
}

#[test]
fn test_lockout_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let now = SystemTime::now();

    {
        let mut core = open_core(&tmp, now);
        for _ in 0..5 {
            core.session_mut().login(ADMIN, &secret("wrong"), now).unwrap();
        }
    }

    let mut core = open_core(&tmp, now + Duration::from_secs(2));
    assert!(core.session().is_locked_out(now + Duration::from_secs(2)));
    assert!(
        !core
            .session_mut()
            .login(ADMIN, &secret(PASSWORD), now + Duration::from_secs(2))
            .unwrap()
    );
}

#[test]
fn test_observers_see_login_and_logout() {
    let tmp = TempDir::new().unwrap();
    let now = SystemTime::now();
    let mut core = open_core(&tmp, now);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    core.session_mut()
        .subscribe(move |change| sink.lock().unwrap().push(change.authenticated));

    core.session_mut().login(ADMIN, &secret(PASSWORD), now).unwrap();
    core.session_mut().logout(now).unwrap();
    core.session_mut().logout(now).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_editor_writes_follow_session() {
    let tmp = TempDir::new().unwrap();
    let now = SystemTime::now();
    let mut core = open_core(&tmp, now);
    let file = encoded_image("badge.png", 16, 16, image::ImageFormat::Png);

    assert!(matches!(
        core.store_asset_as_admin(file.clone(), now),
        Err(SchoolError::Session(SessionError::Unauthorized))
    ));

    core.session_mut().login(ADMIN, &secret(PASSWORD), now).unwrap();
    let id = core.store_asset_as_admin(file, now).unwrap();
    assert_eq!(core.assets().dimensions(&id).unwrap(), Some((16, 16)));
}
