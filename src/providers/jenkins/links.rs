use url::Url;

/// Appends percent-encoded path segments (and an optional raw query) to `base`.
///
/// Each segment is encoded on its own, so a `/` inside a job name stays part
/// of that name instead of becoming a path separator.
pub fn endpoint<'a, I>(base: &Url, segments: I, query: Option<&str>) -> Url
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.set_query(query);
    url
}

/// URL of `tail` below `/job/{job}/`.
pub fn job_endpoint<'a, I>(base: &Url, job: &'a str, tail: I, query: Option<&str>) -> Url
where
    I: IntoIterator<Item = &'a str>,
{
    endpoint(base, ["job", job].into_iter().chain(tail), query)
}

/// Download URL of an artifact. Slashes in `relative_path` are kept as separators.
pub fn artifact_url(base: &Url, job: &str, build_number: u64, relative_path: &str) -> Url {
    let number = build_number.to_string();
    let tail = [number.as_str(), "artifact"]
        .into_iter()
        .chain(relative_path.split('/').filter(|s| !s.is_empty()));
    job_endpoint(base, job, tail, None)
}
