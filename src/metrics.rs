use std::sync::LazyLock;
use std::time::Duration;

use prometheus::*;

static METRIC_REBUILD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!("eigenface_rebuild_duration", "duration of a subspace rebuild in seconds")
        .unwrap()
});

static METRIC_GALLERY_SIZE: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge!("eigenface_gallery_size", "number of faces in the training gallery")
        .unwrap()
});

static METRIC_IDENTIFY_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "eigenface_identify_count",
        "count of identification requests",
        &["result"]
    )
    .unwrap()
});

static METRIC_IDENTIFY_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    register_histogram!(
        "eigenface_identify_duration",
        "duration of a single identification in seconds",
        exponential_buckets(1e-5, 4., 10).unwrap()
    )
    .unwrap()
});

/// 记录一次子空间重建
pub fn observe_rebuild(gallery_size: usize, duration: Duration) {
    METRIC_GALLERY_SIZE.set(gallery_size as i64);
    METRIC_REBUILD_DURATION.observe(duration.as_secs_f64());
}

/// 记录一次识别
pub fn observe_identify(matched: bool, duration: Duration) {
    let result = if matched { "match" } else { "miss" };
    METRIC_IDENTIFY_COUNT.with_label_values(&[result]).inc();
    METRIC_IDENTIFY_DURATION.observe(duration.as_secs_f64());
}

/// 以 prometheus 文本格式导出所有指标
pub fn gather_text() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    Ok(encoder.encode_to_string(&prometheus::gather())?)
}
