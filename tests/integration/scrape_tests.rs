//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the site's hosts and run whole
//! novels through classification, extraction, and storage.

use narou_crawl::config::{Config, EndpointsConfig};
use narou_crawl::crawler::{scrape, NovelScraper, ScrapeOutcome};
use narou_crawl::storage::{SqliteStorage, Storage};
use narou_crawl::{CrawlError, Nid, SubResource};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INFO_PATH: &str = "/ncode/novelview/infotop/ncode/n0001aa/";
const R18_INFO_PATH: &str = "/novel18/novelview/infotop/ncode/n0001aa/";
const TOC_PATH: &str = "/ncode/n0001aa/";
const IMPRESSION_PATH: &str = "/novelcom/impression/list/ncode/1234567/";

fn info_page(author_link: bool) -> String {
    let undernavi = if author_link {
        r#"<ul class="undernavi"><li><a href="https://mypage.syosetu.com/98765/">作者</a></li></ul>"#
    } else {
        ""
    };
    format!(
        r#"<html><head><title>小説情報</title></head><body>
<div id="head_nav">
  <a href="/n0001aa/">小説トップ</a>
  <a href="/novelview/infotop/ncode/n0001aa/">小説情報</a>
  <a href="https://novelcom.syosetu.com/impression/list/ncode/1234567/">感想</a>
</div>
<h1><a href="/n0001aa/">テスト小説</a></h1>
{undernavi}
<table>
  <tr><th>あらすじ</th><td class="ex">あらすじ</td></tr>
  <tr><th>キーワード</th><td>異世界 魔法</td></tr>
  <tr><th>ジャンル</th><td>ハイファンタジー</td></tr>
  <tr><th>掲載日</th><td>2023年 04月01日 12時00分</td></tr>
  <tr><th>感想</th><td>3件</td></tr>
  <tr><th>レビュー</th><td>0件</td></tr>
  <tr><th>ブックマーク登録</th><td>10件</td></tr>
  <tr><th>総合評価</th><td>100pt</td></tr>
  <tr><th>評価ポイント</th><td>80pt</td></tr>
  <tr><th>文字数</th><td>5,000文字</td></tr>
</table>
</body></html>"#
    )
}

fn titled_page(title: &str) -> String {
    format!("<html><head><title>{title}</title></head><body></body></html>")
}

fn impression_listing(stamps: &[&str], nav_pages: Option<u32>) -> String {
    let nav = nav_pages
        .map(|pages| {
            let links: String = (1..=pages)
                .map(|p| format!(r#"<a href="?p={p}">{p}</a>"#))
                .collect();
            format!(r#"<div class="naviall">{links}</div>"#)
        })
        .unwrap_or_default();
    let blocks: String = stamps
        .iter()
        .map(|stamp| {
            format!(
                r#"<div class="waku">
  <div class="comment_info comment_authorbox"><div>投稿者: <a href="https://mypage.syosetu.com/42/">読者</a> [{stamp}]</div></div>
  <div class="comment"><div class="comment_h2">一言</div><div>面白い</div></div>
</div>"#
            )
        })
        .collect();
    format!("<html><head><title>感想一覧</title></head><body>{nav}{blocks}</body></html>")
}

const TOC_PAGE: &str = r#"<html><head><title>テスト小説</title></head><body>
<div class="index_box">
  <div class="chapter_title">第一章</div>
  <dl class="novel_sublist2">
    <dd class="subtitle"><a href="1/">プロローグ</a></dd>
    <dt class="long_update">2023/04/01 12:00</dt>
  </dl>
  <dl class="novel_sublist2">
    <dd class="subtitle"><a href="2/">出発</a></dd>
    <dt class="long_update">2023/04/02 12:00</dt>
  </dl>
</div>
</body></html>"#;

fn chapter_page(body: &str) -> String {
    format!(
        r#"<html><head><title>本文</title></head><body>
<div id="novel_honbun"><p id="L1">{body}</p></div>
</body></html>"#
    )
}

/// Creates a configuration pointing every host at the mock server
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    let mut config = Config {
        endpoints: EndpointsConfig {
            ncode: format!("{}/ncode", base_url),
            novel18: format!("{}/novel18", base_url),
            novelcom: format!("{}/novelcom", base_url),
            novelcom18: format!("{}/novelcom18", base_url),
            api: format!("{}/api", base_url),
        },
        ..Config::default()
    };
    config.scrape.nid = Some("N0001AA".to_string());
    config.network.max_attempts = 2;
    config.network.retry_delay_ms = 10;
    config.network.timeout_secs = 5;
    config.output.database_path = db_path.to_string();
    config
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

fn nid() -> Nid {
    Nid::parse("N0001AA").unwrap()
}

#[tokio::test]
async fn test_full_scrape_of_normal_novel() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), ":memory:");

    mount_html(&mock_server, INFO_PATH, info_page(true)).await;

    // Page 2 is mounted first so it wins over the bare listing path
    Mock::given(method("GET"))
        .and(path(IMPRESSION_PATH))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(impression_listing(
            &["2023年 03月01日 09時00分"],
            Some(2),
        )))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        IMPRESSION_PATH,
        impression_listing(
            &["2023年 04月02日 10時00分", "2023年 04月01日 10時00分"],
            Some(2),
        ),
    )
    .await;

    mount_html(&mock_server, TOC_PATH, TOC_PAGE.to_string()).await;
    mount_html(&mock_server, "/ncode/n0001aa/1/", chapter_page("はじまり")).await;
    mount_html(&mock_server, "/ncode/n0001aa/2/", chapter_page("つづき")).await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(
        outcome,
        ScrapeOutcome::Scraped {
            impressions: Some(3),
            pages: Some(2),
        }
    );

    let storage = scraper.storage();
    let history = storage.get_history("N0001AA").unwrap().unwrap();
    assert!(!history.r18);
    let progress = history.progress();
    assert!(progress.info_done && progress.impressions_done && progress.content_done);

    let info = storage.get_novel_info("N0001AA").unwrap().unwrap();
    assert_eq!(info.title, "テスト小説");
    assert_eq!(info.user_id, Some(98765));

    assert_eq!(storage.get_impressions("N0001AA").unwrap().len(), 3);

    let pages = storage.get_content_pages("N0001AA").unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page_num, 1);
    assert_eq!(pages[0].part.as_deref(), Some("第一章"));
    assert_eq!(pages[1].title, "出発");
    assert_eq!(pages[1].content, "つづき");
}

#[tokio::test]
async fn test_not_found_status_writes_nothing() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), ":memory:");

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::NotFound);
    assert_eq!(scraper.storage().count_tracked().unwrap(), 0);
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_error_page_writes_nothing() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), ":memory:");

    mount_html(&mock_server, INFO_PATH, titled_page("エラー")).await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::NotFound);
    assert_eq!(scraper.storage().count_tracked().unwrap(), 0);
    assert_eq!(scraper.storage().count_novels().unwrap(), 0);
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_age_gated_novel_skipped() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_r18 = true;

    mount_html(&mock_server, INFO_PATH, titled_page("年齢確認")).await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(outcome, ScrapeOutcome::SkippedR18);

    let storage = scraper.storage();
    let history = storage.get_history("N0001AA").unwrap().unwrap();
    assert!(history.r18);
    assert!(!history.progress().info_done);
    assert_eq!(storage.count_novels().unwrap(), 0);
    assert_eq!(storage.count_impressions().unwrap(), 0);
    assert_eq!(storage.count_content_pages().unwrap(), 0);
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_age_gated_novel_scraped_from_r18_host() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_content = true;

    mount_html(&mock_server, INFO_PATH, titled_page("年齢確認")).await;
    mount_html(&mock_server, R18_INFO_PATH, info_page(true)).await;
    mount_html(
        &mock_server,
        "/novelcom18/impression/list/ncode/1234567/",
        impression_listing(&["2023年 04月01日 10時00分"], None),
    )
    .await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(
        outcome,
        ScrapeOutcome::Scraped {
            impressions: Some(1),
            pages: None,
        }
    );

    let history = scraper.storage().get_history("N0001AA").unwrap().unwrap();
    assert!(history.r18);
    let progress = history.progress();
    assert!(progress.info_done);
    assert!(progress.impressions_done);
    assert!(!progress.content_done);
}

#[tokio::test]
async fn test_single_page_novel() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_impressions = true;

    mount_html(&mock_server, INFO_PATH, info_page(true)).await;
    mount_html(&mock_server, TOC_PATH, chapter_page("短編の本文")).await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(
        outcome,
        ScrapeOutcome::Scraped {
            impressions: None,
            pages: Some(1),
        }
    );

    let pages = scraper.storage().get_content_pages("N0001AA").unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "テスト小説");
    assert_eq!(pages[0].part, None);
    assert_eq!(pages[0].content, "短編の本文");
}

#[tokio::test]
async fn test_rescrape_drops_pages_missing_from_contents() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_impressions = true;

    let three_pages = TOC_PAGE.replace(
        "</div>\n</body>",
        r#"  <dl class="novel_sublist2">
    <dd class="subtitle"><a href="3/">到着</a></dd>
    <dt class="long_update">2023/04/03 12:00</dt>
  </dl>
</div>
</body>"#,
    );
    mount_html(&mock_server, INFO_PATH, info_page(true)).await;
    mount_html(&mock_server, TOC_PATH, three_pages).await;
    for page in 1..=3 {
        mount_html(
            &mock_server,
            &format!("/ncode/n0001aa/{}/", page),
            chapter_page("本文"),
        )
        .await;
    }

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    scraper.scrape(&nid()).await.unwrap();
    assert_eq!(scraper.storage().count_content_pages().unwrap(), 3);

    // The author removed the last page
    mock_server.reset().await;
    mount_html(&mock_server, INFO_PATH, info_page(true)).await;
    mount_html(&mock_server, TOC_PATH, TOC_PAGE.to_string()).await;
    for page in 1..=2 {
        mount_html(
            &mock_server,
            &format!("/ncode/n0001aa/{}/", page),
            chapter_page("本文"),
        )
        .await;
    }

    let outcome = scraper.scrape(&nid()).await.unwrap();
    assert_eq!(
        outcome,
        ScrapeOutcome::Scraped {
            impressions: None,
            pages: Some(2),
        }
    );
    let pages = scraper.storage().get_content_pages("N0001AA").unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].title, "出発");
}

#[tokio::test]
async fn test_user_id_from_api_when_page_has_no_author_link() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_impressions = true;
    config.scrape.skip_content = true;

    mount_html(&mock_server, INFO_PATH, info_page(false)).await;
    Mock::given(method("GET"))
        .and(path("/api/novelapi/api/"))
        .and(query_param("ncode", "n0001aa"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[{"allcount":1},{"userid":4321}]"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    scraper.scrape(&nid()).await.unwrap();

    let info = scraper.storage().get_novel_info("N0001AA").unwrap().unwrap();
    assert_eq!(info.user_id, Some(4321));
}

#[tokio::test]
async fn test_skip_scraped_resumes_without_refetching() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_scraped = true;

    mount_html(&mock_server, INFO_PATH, info_page(true)).await;

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    storage.ensure_tracked("N0001AA", false).unwrap();
    storage
        .mark_done("N0001AA", SubResource::Impressions, chrono::Utc::now())
        .unwrap();
    storage
        .mark_done("N0001AA", SubResource::Content, chrono::Utc::now())
        .unwrap();

    let mut scraper = NovelScraper::new(&config, storage).unwrap();
    let outcome = scraper.scrape(&nid()).await.unwrap();

    assert_eq!(
        outcome,
        ScrapeOutcome::Scraped {
            impressions: None,
            pages: None,
        }
    );
    // Only the info page: impressions and content were already done
    assert_eq!(request_count(&mock_server).await, 1);
    assert!(scraper
        .storage()
        .get_progress("N0001AA")
        .unwrap()
        .info_done);
}

#[tokio::test]
async fn test_failure_rolls_back_novel() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri(), ":memory:");
    config.scrape.skip_impressions = true;

    mount_html(&mock_server, INFO_PATH, info_page(true)).await;
    mount_html(&mock_server, TOC_PATH, TOC_PAGE.to_string()).await;
    mount_html(&mock_server, "/ncode/n0001aa/1/", chapter_page("はじまり")).await;
    Mock::given(method("GET"))
        .and(path("/ncode/n0001aa/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut scraper =
        NovelScraper::new(&config, SqliteStorage::new_in_memory().unwrap()).unwrap();
    let result = scraper.scrape(&nid()).await;

    assert!(matches!(
        result,
        Err(CrawlError::RetriesExhausted { attempts: 2, .. })
    ));

    let storage = scraper.storage();
    assert_eq!(storage.count_tracked().unwrap(), 0);
    assert_eq!(storage.count_novels().unwrap(), 0);
    assert_eq!(storage.count_content_pages().unwrap(), 0);
}

#[tokio::test]
async fn test_run_over_single_identifier_range() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("novels.db");
    let mut config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());
    config.scrape.nid = None;
    config.scrape.start_from = "N0001AA".to_string();
    config.scrape.end_with = "N0001AA".to_string();

    Mock::given(method("GET"))
        .and(path(INFO_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = scrape(&config).await.unwrap();

    assert_eq!(summary.visited(), 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_run_walks_range_and_persists() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("novels.db");
    let mut config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());
    config.scrape.nid = None;
    config.scrape.start_from = "N9999AA".to_string();
    config.scrape.end_with = "N0001AB".to_string();
    config.scrape.skip_r18 = true;

    mount_html(
        &mock_server,
        "/ncode/novelview/infotop/ncode/n9999aa/",
        titled_page("年齢確認"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/ncode/novelview/infotop/ncode/n0000ab/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/ncode/novelview/infotop/ncode/n0001ab/",
        titled_page("エラー"),
    )
    .await;

    let summary = scrape(&config).await.unwrap();
    assert_eq!(summary.skipped_r18, 1);
    assert_eq!(summary.not_found, 2);
    assert_eq!(request_count(&mock_server).await, 3);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_tracked().unwrap(), 1);
    assert!(storage.get_history("N9999AA").unwrap().unwrap().r18);
}
