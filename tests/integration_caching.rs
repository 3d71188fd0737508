// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Caching and eager loading through bound contracts

mod utils;

use externalized_properties::caching::{
    CacheStrategyKind, ConcurrentMapCacheStrategy, ExpiringCacheStrategy,
};
use externalized_properties::contract::OperationDescriptor;
use externalized_properties::resolver::CachingResolver;
use externalized_properties::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use utils::{RecordingResolver, as_resolver};

fn contract() -> Contract {
    Contract::builder("App")
        .operation(OperationDescriptor::builder("name"))
        .operation(OperationDescriptor::builder("threads").returns_type::<u32>())
        .operation(OperationDescriptor::builder("motd").returns_type::<Option<String>>())
        .operation(
            OperationDescriptor::builder("lookup")
                .property_from_argument(0)
                .returns_type::<Option<String>>(),
        )
        .build()
        .unwrap()
}

fn cached(source: &Arc<RecordingResolver>, config: CacheConfig) -> ExternalizedProperties {
    ExternalizedProperties::builder()
        .resolver(as_resolver(source))
        .with_default_converters()
        .cache_config(config)
        .build()
        .unwrap()
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_cached_until_expired() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let config = CacheConfig::new(CacheStrategyKind::Concurrent, None, false);
    let proxy = cached(&source, config).bind(contract()).unwrap();

    assert_eq!(proxy.get::<String>("name").unwrap(), "alpha");
    source.set("name", "beta");
    assert_eq!(proxy.get::<String>("name").unwrap(), "alpha");
    assert_eq!(source.lookups(), 1);

    proxy.expire("name", []).unwrap();
    assert_eq!(proxy.get::<String>("name").unwrap(), "beta");
    assert_eq!(source.lookups(), 2);
}

#[test]
fn test_arguments_are_part_of_the_key() {
    let source = RecordingResolver::new("source", &[("a", "1"), ("b", "2")]);
    let proxy = cached(&source, CacheConfig::new(CacheStrategyKind::Weak, None, false))
        .bind(contract())
        .unwrap();

    let lookup = |name: &str| {
        proxy
            .get_with::<Option<String>>("lookup", [name.into()])
            .unwrap()
    };
    for _ in 0..3 {
        assert_eq!(lookup("a").as_deref(), Some("1"));
        assert_eq!(lookup("b").as_deref(), Some("2"));
    }
    assert_eq!(source.lookups(), 2);

    proxy.expire("lookup", ["a".into()]).unwrap();
    lookup("a");
    lookup("b");
    assert_eq!(source.lookups(), 3);
}

#[test]
fn test_absent_and_failed_results_are_retried() {
    let source = RecordingResolver::new("source", &[("threads", "many")]);
    let proxy = cached(&source, CacheConfig::new(CacheStrategyKind::Concurrent, None, false))
        .bind(contract())
        .unwrap();

    assert_eq!(proxy.get::<Option<String>>("motd").unwrap(), None);
    assert_eq!(proxy.get::<Option<String>>("motd").unwrap(), None);
    assert_eq!(source.lookups(), 2);

    assert!(proxy.get::<u32>("threads").is_err());
    source.set("threads", "8");
    assert_eq!(proxy.get::<u32>("threads").unwrap(), 8);
}

#[test]
fn test_time_expiring_cache() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let config = CacheConfig::new(
        CacheStrategyKind::Concurrent,
        Some(Duration::from_millis(100)),
        false,
    );
    let properties = cached(&source, config);
    let proxy = properties.bind(contract()).unwrap();

    proxy.get::<String>("name").unwrap();
    let cache = properties.cache().unwrap();
    assert_eq!(cache.len(), 1);

    thread::sleep(Duration::from_millis(150));
    assert!(wait_until(Duration::from_secs(2), || cache.is_empty()));

    proxy.get::<String>("name").unwrap();
    assert_eq!(source.lookups(), 2);
}

#[test]
fn test_builder_cache_duration() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let properties = ExternalizedProperties::builder()
        .resolver(as_resolver(&source))
        .enable_caching()
        .cache_duration(Duration::from_millis(100))
        .build()
        .unwrap();
    let proxy = properties.bind(contract()).unwrap();

    proxy.get::<String>("name").unwrap();
    proxy.get::<String>("name").unwrap();
    assert_eq!(source.lookups(), 1);

    assert!(wait_until(Duration::from_secs(2), || {
        proxy.get::<String>("name").unwrap();
        source.lookups() > 1
    }));
}

#[test]
fn test_eager_loading_primes_cache() {
    let source = RecordingResolver::new("source", &[("name", "alpha"), ("threads", "4")]);
    let properties = ExternalizedProperties::builder()
        .resolver(as_resolver(&source))
        .with_default_converters()
        .enable_eager_loading()
        .build()
        .unwrap();

    let proxy = properties.bind(contract()).unwrap();
    // name, threads and motd are eligible; lookup takes an argument
    assert_eq!(source.lookups(), 3);
    assert_eq!(properties.cache().unwrap().len(), 2);

    source.set("name", "beta");
    assert_eq!(proxy.get::<String>("name").unwrap(), "alpha");
    assert_eq!(proxy.get::<u32>("threads").unwrap(), 4);
    assert_eq!(source.lookups(), 3);
}

#[test]
fn test_eager_loading_fails_fast() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let properties = ExternalizedProperties::builder()
        .resolver(as_resolver(&source))
        .with_default_converters()
        .enable_eager_loading()
        .build()
        .unwrap();

    let err = properties.bind(contract()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("threads() -> u32"));
    assert!(properties.cache().unwrap().is_empty());
}

#[test]
fn test_cache_shared_between_contracts() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let config = CacheConfig::new(CacheStrategyKind::Concurrent, None, false);
    let properties = cached(&source, config);
    let first = properties.bind(contract()).unwrap();
    let second = properties.bind(contract()).unwrap();

    first.get::<String>("name").unwrap();
    second.get::<String>("name").unwrap();
    // separately bound contracts have distinct operation identities
    assert_eq!(source.lookups(), 2);
    assert_eq!(properties.cache().unwrap().len(), 2);

    first.expire_all();
    assert!(properties.cache().unwrap().is_empty());
}

#[test]
fn test_weak_cache_drops_entries_of_dropped_contracts() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let properties = cached(&source, CacheConfig::new(CacheStrategyKind::Weak, None, false));
    let cache = properties.cache().unwrap().clone();

    let proxy = properties.bind(contract()).unwrap();
    proxy.get::<String>("name").unwrap();
    assert_eq!(cache.len(), 1);

    drop(proxy);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_expiring_decorates_any_strategy() {
    let key = "k".to_string();
    let base: Arc<dyn CacheStrategy<String, String>> = Arc::new(ConcurrentMapCacheStrategy::new());
    let expiring = ExpiringCacheStrategy::new(base.clone(), Duration::from_millis(50)).unwrap();

    expiring.cache(key.clone(), "v".to_string());
    assert_eq!(expiring.get(&key).as_deref(), Some("v"));
    assert!(wait_until(Duration::from_secs(2), || expiring.get(&key).is_none()));
    assert!(wait_until(Duration::from_secs(2), || base.is_empty()));
}

#[test]
fn test_caching_resolver() {
    let source = RecordingResolver::new("source", &[("name", "alpha")]);
    let resolver = Arc::new(CachingResolver::new(
        source.clone(),
        Arc::new(ConcurrentMapCacheStrategy::new()),
    ));
    let properties = ExternalizedProperties::builder()
        .resolver(resolver.clone())
        .build()
        .unwrap();

    let resolve = || properties.resolve_property("name").unwrap();
    assert_eq!(resolve().as_deref(), Some("alpha"));
    source.set("name", "beta");
    assert_eq!(resolve().as_deref(), Some("alpha"));
    assert_eq!(source.lookups(), 1);

    resolver.expire("name");
    assert_eq!(resolve().as_deref(), Some("beta"));
}
