/// Read-through caching around a provider call.
///
/// Returns the cached value for `$key` when present. Otherwise awaits
/// `$block`, hands the result to the background writer with `$ttl` seconds
/// to live, and returns it. Errors from `$block` propagate and are never
/// cached.
///
/// # Example
/// ```rust,ignore
/// cached!(self.cache, CacheKey::Recommendations(id), RECS_CACHE_TTL, async move {
///     fetch_recommendations(id).await
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
