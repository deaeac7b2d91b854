#![cfg(feature = "redis-store")]

use std::{env, sync::Arc, time::Instant};

use tollgate::{
    Namespace, Permits, RedisStore, Rpm, Semaphore, SemaphoreOptions, Store, StoreKey, Throttle,
    ThrottleOptions,
};

fn redis_url() -> Option<String> {
    env::var("REDIS_URL").ok()
}

fn unique_key(suffix: &str) -> StoreKey {
    let n: u64 = rand::random();
    StoreKey::try_from(format!("tollgate_test_{n}:{suffix}")).unwrap()
}

struct ThrottleKeys {
    count: StoreKey,
    timer: StoreKey,
    mutex: StoreKey,
    mutex_init: StoreKey,
}

fn unique_throttle(store: &Arc<RedisStore>, rpm: f64) -> (Throttle<RedisStore>, ThrottleKeys) {
    let keys = ThrottleKeys {
        count: unique_key("count"),
        timer: unique_key("timer"),
        mutex: unique_key("mutex"),
        mutex_init: unique_key("mutex:init"),
    };

    let mut options = ThrottleOptions::new(Rpm::try_from(rpm).unwrap());
    options.count_key = Some(keys.count.clone());
    options.timer_key = Some(keys.timer.clone());
    options.mutex_key = Some(keys.mutex.clone());
    options.mutex_key_init = Some(keys.mutex_init.clone());

    (Throttle::new(store.clone(), options), keys)
}

#[test]
fn throttle_spaces_calls_and_counts_them() {
    let Some(url) = redis_url() else {
        return;
    };

    let store = Arc::new(RedisStore::open(&url).unwrap());
    let (throttle, keys) = unique_throttle(&store, 600.0);

    // interval = 0.1s; five calls cover at least four full intervals.
    let start = Instant::now();
    for _ in 0..5 {
        throttle.throttle().unwrap();
    }
    let elapsed = start.elapsed();

    assert!(
        elapsed.as_secs_f64() >= 0.35,
        "five calls finished in {elapsed:?}"
    );

    let count = store.get(Namespace::default(), &keys.count).unwrap();
    assert_eq!(count.as_deref(), Some("5"));

    throttle.cleanup().unwrap();
}

#[test]
fn semaphore_hands_the_token_between_instances() {
    let Some(url) = redis_url() else {
        return;
    };

    let store = Arc::new(RedisStore::open(&url).unwrap());
    let options = SemaphoreOptions {
        permits: Permits::one(),
        namespace: Namespace::default(),
        gate_key: unique_key("gate"),
        init_key: unique_key("init"),
    };

    let first = Semaphore::new(store.clone(), options.clone());
    let second = Semaphore::new(store.clone(), options.clone());

    assert_eq!(first.acquire().unwrap(), "1");
    first.release().unwrap();

    // The second instance loses the seeding race and takes the released
    // token.
    assert_eq!(second.acquire().unwrap(), "1");
    second.release().unwrap();

    first.cleanup().unwrap();
    let gate = store.get(Namespace::default(), &options.gate_key).unwrap();
    let init = store.get(Namespace::default(), &options.init_key).unwrap();
    assert_eq!(gate, None);
    assert_eq!(init, None);
}

#[test]
fn cleanup_is_idempotent() {
    let Some(url) = redis_url() else {
        return;
    };

    let store = Arc::new(RedisStore::open(&url).unwrap());
    let (throttle, keys) = unique_throttle(&store, 600.0);

    throttle.throttle().unwrap();

    throttle.cleanup().unwrap();
    throttle.cleanup().unwrap();

    for key in [&keys.count, &keys.timer, &keys.mutex, &keys.mutex_init] {
        let value = store.get(Namespace::default(), key).unwrap();
        assert_eq!(value, None, "{key} left behind");
    }
}
