use std::time::Duration;

use econ_dash::app::pipeline::{country_projections, load_latest_release};
use econ_dash::data::weo::HttpWeoDownloader;
use econ_dash::error::NoticeLevel;
use econ_dash::projections::ProjectionKind;
use httpmock::prelude::*;

const RELEASE: &str = "WEO Country Code\tISO\tWEO Subject Code\tCountry\tSubject Descriptor\t2023\t2024\n\
138\tNLD\tNGDP_RPCH\tNetherlands\tGross domestic product, constant prices\t0.1\t0.9\n\
138\tNLD\tPCPIPCH\tNetherlands\tInflation, average consumer prices\t4.1\t3.2\n\
138\tNLD\tNGDP\tNetherlands\tGross domestic product, current prices\t1,034.5\t1,090.0\n\
138\tNLD\tNGDPD\tNetherlands\tGross domestic product, current prices\t1,118.0\t1,180.0\n\
138\tNLD\tGGR\tNetherlands\tGeneral government revenue\t440.0\t460.0\n\
138\tNLD\tGGX\tNetherlands\tGeneral government total expenditure\t445.0\t480.0\n\
138\tNLD\tBCA\tNetherlands\tCurrent account balance\t110.0\t105.0\n\
138\tNLD\tGGXWDG\tNetherlands\tGeneral government gross debt\t470.0\t480.0\n\
138\tNLD\tGGXWDN\tNetherlands\tGeneral government net debt\tn/a\t--\n\
International Monetary Fund, World Economic Outlook Database, August 2024\n";

fn downloader(server: &MockServer) -> HttpWeoDownloader {
    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpWeoDownloader::new(http, format!("{}/weo/{{year}}/WEO{{release}}{{year}}all.ashx", server.base_url()))
}

#[test]
fn walks_back_past_missing_and_html_releases() {
    let server = MockServer::start();
    let oct = server.mock(|when, then| {
        when.method(GET).path("/weo/2024/WEOOct2024all.ashx");
        then.status(404);
    });
    let sep = server.mock(|when, then| {
        when.method(GET).path("/weo/2024/WEOSep2024all.ashx");
        then.status(200).body("<html><body>Page not found</body></html>");
    });
    let aug = server.mock(|when, then| {
        when.method(GET).path("/weo/2024/WEOAug2024all.ashx");
        then.status(200).body(RELEASE);
    });

    let dir = tempfile::tempdir().unwrap();
    let loaded = load_latest_release(&downloader(&server), 2024, 10, dir.path()).unwrap();

    oct.assert();
    sep.assert();
    aug.assert();

    assert_eq!(loaded.release.release, "Aug");
    assert_eq!(loaded.release.path, dir.path().join("weo_2024_Aug.csv"));
    assert!(loaded.release.path.exists());
    // The HTML page was not written to disk.
    assert!(!dir.path().join("weo_2024_Sep.csv").exists());

    let warnings = loaded
        .notices
        .iter()
        .filter(|n| n.level == NoticeLevel::Warning)
        .count();
    assert_eq!(warnings, 2);
    assert_eq!(loaded.dataset.years(), &[2023, 2024]);

    let projections = country_projections(&loaded.dataset, "NLD").unwrap();
    assert_eq!(projections.country, "Netherlands");
    let cpi = projections.get(ProjectionKind::Cpi);
    assert_eq!(cpi.get(2024), Some(3.2));
    assert!(projections.get(ProjectionKind::NetDebt).is_empty());
}

#[test]
fn gives_up_after_every_month_fails() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET).path_contains("/weo/2024/");
        then.status(404);
    });

    let dir = tempfile::tempdir().unwrap();
    let err = load_latest_release(&downloader(&server), 2024, 3, dir.path()).unwrap_err();

    any.assert_hits(3);
    assert_eq!(err.exit_code(), 4);
    assert!(err.message().contains("3 attempts"));
    let failed: Vec<_> = err.notices().iter().map(|n| n.message.as_str()).collect();
    assert_eq!(failed.len(), 3);
    assert!(failed[0].starts_with("Download failed for Mar 2024"));
    assert!(failed[2].starts_with("Download failed for Jan 2024"));
}
