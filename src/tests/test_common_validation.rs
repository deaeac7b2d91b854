use crate::{Namespace, Permits, Rpm, StoreKey, TollgateError};

#[test]
fn store_key_try_from_validates_non_empty() {
    let key = StoreKey::try_from("t:count").unwrap();
    assert_eq!(key.as_str(), "t:count");

    assert!(matches!(
        StoreKey::try_from(""),
        Err(TollgateError::InvalidKey(_))
    ));
}

#[test]
fn store_key_try_from_validates_max_length() {
    let key = StoreKey::try_from("a".repeat(255)).unwrap();
    assert_eq!(key.len(), 255);

    assert!(matches!(
        StoreKey::try_from("a".repeat(256)),
        Err(TollgateError::InvalidKey(_))
    ));
}

#[test]
fn rpm_try_from_validates_finite_positive() {
    let rpm = Rpm::try_from(240.0).unwrap();
    assert_eq!(*rpm, 240.0);

    assert!(matches!(
        Rpm::try_from(0.0),
        Err(TollgateError::InvalidRate(_))
    ));
    assert!(matches!(
        Rpm::try_from(-60.0),
        Err(TollgateError::InvalidRate(_))
    ));
    assert!(matches!(
        Rpm::try_from(f64::NAN),
        Err(TollgateError::InvalidRate(_))
    ));
    assert!(matches!(
        Rpm::try_from(f64::INFINITY),
        Err(TollgateError::InvalidRate(_))
    ));
}

#[test]
fn permits_try_from_validates_min_1() {
    let permits = Permits::try_from(3).unwrap();
    assert_eq!(*permits, 3);

    assert_eq!(*Permits::one(), 1);

    assert!(matches!(
        Permits::try_from(0),
        Err(TollgateError::InvalidPermits(_))
    ));
}

#[test]
fn namespace_defaults_to_partition_zero() {
    assert_eq!(*Namespace::default(), 0);
    assert_eq!(*Namespace::from(7), 7);
}
