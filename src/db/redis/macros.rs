/// Read-through caching against an optional [`Cache`](crate::db::Cache).
///
/// With a cache present, a hit is returned directly; on a miss the block is
/// awaited, its value queued for storage and then returned. Without a cache
/// the block is simply awaited.
///
/// # Arguments
/// * `$cache`: `Option<&Cache>` (anything with `get_from_cache` and `set_in_background`).
/// * `$key`: the [`CacheKey`](crate::db::CacheKey) to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let track = cached!(self.cache.as_ref(), CacheKey::TrackSearch(q.clone()), TTL, async move {
///     self.search_uncached(token, &q).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => {
                let key = $key;
                if let Some(cached) = cache.get_from_cache(&key).await? {
                    Ok(cached)
                } else {
                    let value = $block.await?;
                    cache.set_in_background(&key, &value, $ttl);
                    Ok(value)
                }
            }
            None => $block.await,
        }
    }};
}
