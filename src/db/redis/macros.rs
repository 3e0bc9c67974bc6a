/// Read-through caching for a catalog lookup.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues the
/// result for a background write and returns it. A failed cache read is logged
/// and treated as a miss so Redis trouble never fails a catalog lookup.
///
/// # Arguments
/// * `$cache`: anything with `get_from_cache` and `set_in_background`.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds for the stored value.
/// * `$block`: future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let detail = cached!(self.cache, CacheKey::ItemDetail(id), DETAIL_TTL, async move {
///     self.inner.item_detail(id).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    tracing::warn!(error = %e, key = %key, "Cache read failed, fetching upstream");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
