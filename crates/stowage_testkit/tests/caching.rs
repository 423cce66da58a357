//! Cache-strategy integration tests.

use std::sync::Arc;

use futures::FutureExt;
use sha2::{Digest, Sha256};
use stowage_cache::{
    All, Cache, DigestVerification, FromRemoteCache, FromStorageCache, Remote, Standard,
};
use stowage_core::{Content, Key, Storage, StoreError};
use stowage_testkit::prelude::*;

fn remote_of(payload: &'static [u8]) -> impl Remote {
    move || async move { Ok(Some(Content::from_bytes(payload))) }.boxed()
}

fn failing_remote() -> impl Remote {
    || async { Err(StoreError::Io(std::io::Error::other("remote down"))) }.boxed()
}

#[tokio::test]
async fn cache_preferred_fill_then_serve_offline() {
    let fixture = TestStorage::file().await;
    let cache = FromStorageCache::new(fixture.storage());
    let key = Key::from("artifacts/lib.bin");

    let first = cache
        .load(&key, &remote_of(b"R"), &Standard::Always)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.read_all().await.unwrap().as_ref(), b"R");

    // The remote may now disappear; the cache serves the copy.
    let second = cache
        .load(&key, &failing_remote(), &Standard::Always)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.read_all().await.unwrap().as_ref(), b"R");
}

#[tokio::test]
async fn remote_preferred_fill_then_fall_back() {
    let fixture = TestStorage::file().await;
    let cache = FromRemoteCache::new(fixture.storage());
    let key = Key::from("artifacts/app.bin");

    cache
        .load(&key, &remote_of(b"X"), &Standard::Always)
        .await
        .unwrap();

    let fallback = cache
        .load(&key, &failing_remote(), &Standard::Always)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fallback.read_all().await.unwrap().as_ref(), b"X");
}

#[tokio::test]
async fn digest_verification_detects_cache_corruption() {
    let storage = TestStorage::memory().storage();
    let cache = FromStorageCache::new(Arc::clone(&storage));
    let key = Key::from("artifacts/checked.bin");
    let control = DigestVerification::new(Sha256::digest(b"payload").to_vec());

    // A pristine cached copy passes the digest and is served without the
    // remote being available.
    storage
        .save(&key, Content::from_bytes("payload"))
        .await
        .unwrap();
    let served = cache
        .load(&key, &failing_remote(), &control)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(served.read_all().await.unwrap().as_ref(), b"payload");

    // Corrupt the cached copy: the digest rejects it and the remote
    // repairs the cache.
    storage
        .save(&key, Content::from_bytes("tampered"))
        .await
        .unwrap();
    let repaired = cache
        .load(&key, &remote_of(b"payload"), &control)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(repaired.read_all().await.unwrap().as_ref(), b"payload");

    let cached = storage.value(&key).await.unwrap();
    assert_eq!(cached.read_all().await.unwrap().as_ref(), b"payload");
}

#[tokio::test]
async fn composed_policies_must_all_pass() {
    let storage = TestStorage::memory().storage();
    let cache = FromStorageCache::new(Arc::clone(&storage));
    let key = Key::from("artifacts/gated.bin");

    storage
        .save(&key, Content::from_bytes("cached"))
        .await
        .unwrap();

    let digest_ok = DigestVerification::new(Sha256::digest(b"cached").to_vec());
    let strict = All::new(vec![
        Arc::new(Standard::Always),
        Arc::new(digest_ok),
        Arc::new(Standard::NoCache),
    ]);

    // NoCache vetoes the conjunction, so the remote wins.
    let loaded = cache
        .load(&key, &remote_of(b"fresh"), &strict)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.read_all().await.unwrap().as_ref(), b"fresh");
}

#[tokio::test]
async fn cache_read_failure_degrades_to_remote() {
    let flaky = Arc::new(FlakyStorage::new(TestStorage::memory().storage()));
    let cache = FromStorageCache::new(flaky.clone() as Arc<dyn Storage>);
    let key = Key::from("artifacts/shaky.bin");

    cache
        .load(&key, &remote_of(b"seed"), &Standard::Always)
        .await
        .unwrap();

    // The cached read breaks; the load must fall through to the remote
    // instead of failing.
    flaky.fail_values(1);
    let loaded = cache
        .load(&key, &remote_of(b"recovered"), &Standard::Always)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.read_all().await.unwrap().as_ref(), b"recovered");
}

#[tokio::test]
async fn one_time_remote_content_is_stored_intact() {
    use futures::stream::{self, StreamExt};

    let storage = TestStorage::memory().storage();
    let cache = FromStorageCache::new(Arc::clone(&storage));
    let key = Key::from("artifacts/streamed.bin");

    let one_shot_remote = || {
        async {
            let chunks = stream::iter(vec![
                Ok(bytes::Bytes::from_static(b"st")),
                Ok(bytes::Bytes::from_static(b"re")),
                Ok(bytes::Bytes::from_static(b"am")),
            ])
            .boxed();
            Ok(Some(Content::one_time(Some(6), chunks)))
        }
        .boxed()
    };

    let loaded = cache
        .load(&key, &one_shot_remote, &Standard::Always)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.size(), Some(6));
    assert_eq!(loaded.read_all().await.unwrap().as_ref(), b"stream");
}
