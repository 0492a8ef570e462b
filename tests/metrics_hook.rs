mod common;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use htmlclones::{
    ClusterError, DocumentError, PerceptualError, PipelineMetrics, process_directory,
    set_pipeline_metrics,
};

use common::{offline_config, page, write_site};

#[derive(Default)]
struct Counters {
    extract_ok: AtomicUsize,
    extract_err: AtomicUsize,
    fingerprint: AtomicUsize,
    cluster: AtomicUsize,
}

impl PipelineMetrics for Counters {
    fn record_extract(&self, _latency: Duration, result: Result<(), DocumentError>) {
        match result {
            Ok(()) => self.extract_ok.fetch_add(1, Ordering::SeqCst),
            Err(_) => self.extract_err.fetch_add(1, Ordering::SeqCst),
        };
    }

    fn record_fingerprint(&self, _latency: Duration, _result: Result<(), PerceptualError>) {
        self.fingerprint.fetch_add(1, Ordering::SeqCst);
    }

    fn record_cluster(&self, _latency: Duration, _result: Result<(), ClusterError>) {
        self.cluster.fetch_add(1, Ordering::SeqCst);
    }
}

// The recorder is process-global, so this binary holds a single test.
#[test]
fn every_stage_reports_to_the_installed_recorder() {
    let tmp = tempfile::tempdir().unwrap();
    let site = write_site(
        &tmp.path().join("tier1"),
        &[("a.html", &page("alpha")), ("b.html", &page("beta"))],
    );
    fs::write(site.join("c.html"), [0xc3, 0x28]).unwrap();

    let counters = Arc::new(Counters::default());
    set_pipeline_metrics(Some(counters.clone()));
    let report = process_directory(&site, &offline_config()).unwrap();
    set_pipeline_metrics(None);

    assert_eq!(report.documents, 2);
    assert_eq!(counters.extract_ok.load(Ordering::SeqCst), 2);
    assert_eq!(counters.extract_err.load(Ordering::SeqCst), 1);
    assert_eq!(counters.fingerprint.load(Ordering::SeqCst), 2);
    assert_eq!(counters.cluster.load(Ordering::SeqCst), 1);

    process_directory(&site, &offline_config()).unwrap();
    assert_eq!(counters.cluster.load(Ordering::SeqCst), 1);
}
