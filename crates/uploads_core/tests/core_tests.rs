use std::time::Duration;

use httpmock::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

use uploads_core::{
    collect_since, export_json, keyword_match, normalize_image_url, parse_keywords, parse_uid,
    validate_credential, BiliClient, ClientOptions, ConfigManager, Credential, ExportRecord,
    MatchField, MatchMode, ScrapeSession, Selection, VideoRecord, EMPTY_SENTINEL,
};

type TestResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn test_client(server: &MockServer) -> BiliClient {
    BiliClient::new(ClientOptions {
        timeout: Duration::from_secs(5),
        credential: None,
        base_url: Some(server.base_url()),
    })
    .expect("client")
}

fn video_json(bvid: &str, title: &str, created: i64) -> Value {
    json!({
        "bvid": bvid,
        "aid": 100,
        "title": title,
        "description": "",
        "pic": "//i0.hdslb.com/cover.jpg",
        "created": created,
        "length": "05:00",
        "play": 42,
        "video_review": 3,
        "favorites": 7
    })
}

fn page_body(videos: Vec<Value>) -> Value {
    json!({
        "code": 0,
        "data": { "list": { "vlist": videos } }
    })
}

fn record(title: &str, description: &str, created: i64) -> VideoRecord {
    VideoRecord {
        bvid: "BV1xx41117xb".to_string(),
        aid: 1,
        title: title.to_string(),
        description: description.to_string(),
        pic: String::new(),
        created,
        created_str: String::new(),
        length: "05:00".to_string(),
        play: 0,
        video_review: 0,
        favorites: 0,
    }
}

#[test]
fn parse_uid_accepts_digits_and_space_url() {
    assert_eq!(parse_uid("3546883777629058").unwrap(), 3546883777629058);
    assert_eq!(
        parse_uid("https://space.bilibili.com/3546883777629058").unwrap(),
        3546883777629058
    );
    assert!(parse_uid("https://space.bilibili.com/").is_err());
    assert!(parse_uid("").is_err());
}

#[test]
fn parse_keywords_splits_on_comma_or_whitespace() {
    assert_eq!(parse_keywords("游戏, 攻略"), vec!["游戏", "攻略"]);
    assert_eq!(parse_keywords("游戏 攻略"), vec!["游戏", "攻略"]);
    assert_eq!(parse_keywords("  a , ,b  "), vec!["a", "b"]);
    assert!(parse_keywords("   ").is_empty());
}

#[test]
fn keyword_match_any_vs_all() {
    let videos = vec![record("apple pie", "", 0)];
    let keywords = vec!["a".to_string(), "b".to_string()];
    let any = keyword_match(&videos, MatchField::Title, &keywords, MatchMode::Any);
    let all = keyword_match(&videos, MatchField::Title, &keywords, MatchMode::All);
    assert_eq!(any, vec![true]);
    assert_eq!(all, vec![false]);
}

#[test]
fn keyword_match_is_case_insensitive_on_description() {
    let videos = vec![record("", "游戏解说 Gameplay", 0), record("", "美食", 0)];
    let keywords = vec!["gameplay".to_string()];
    let matches = keyword_match(&videos, MatchField::Description, &keywords, MatchMode::Any);
    assert_eq!(matches, vec![true, false]);
}

#[test]
fn selection_bulk_operators() {
    let mut selection = Selection::new(4);
    selection.select_all();
    assert_eq!(selection.count_selected(), 4);
    selection.select_all();
    assert_eq!(selection.count_selected(), 4);

    selection.clear_all();
    assert_eq!(selection.flags(), &[false, false, false, false]);

    selection.invert_all();
    assert_eq!(selection.count_selected(), 4);
}

#[test]
fn selection_keyword_operators() {
    let matches = vec![true, false, true, false];

    // 并集：已有勾选保持
    let mut selection = Selection::new(4);
    selection.manual_edit(vec![false, true, false, false]).unwrap();
    selection.apply_select(&matches);
    assert_eq!(selection.flags(), &[true, true, true, false]);

    // 仅翻转命中项
    selection.apply_invert_on_match(&matches);
    assert_eq!(selection.flags(), &[false, true, false, false]);

    // 覆盖且幂等
    selection.apply_restrict_to(&matches);
    assert_eq!(selection.flags(), matches.as_slice());
    selection.apply_restrict_to(&matches);
    assert_eq!(selection.flags(), matches.as_slice());
}

#[test]
fn selection_manual_edit_rejects_length_mismatch() {
    let mut selection = Selection::new(3);
    assert!(selection.manual_edit(vec![true, false]).is_err());
    assert_eq!(selection.len(), 3);
    selection.manual_edit(vec![true, false, true]).unwrap();
    assert_eq!(selection.count_selected(), 2);
}

#[test]
fn selection_resyncs_on_length_change() {
    let mut selection = Selection::new(2);
    selection.select_all();
    selection.sync_len(5);
    assert_eq!(selection.len(), 5);
    assert_eq!(selection.count_selected(), 0);
}

#[test]
fn export_empty_list_yields_sentinel() {
    assert_eq!(export_json(&[]), EMPTY_SENTINEL);
    assert_eq!(export_json(&[]).len(), 2);
}

#[test]
fn export_preserves_non_ascii_and_indentation() -> TestResult<()> {
    let records = vec![ExportRecord {
        bvid: "BV1xx41117xb".to_string(),
        title: "视频一".to_string(),
        description: "测试简介".to_string(),
        pic: "https://i0.hdslb.com/cover.jpg".to_string(),
        created_str: "2025-08-01 12:00:00".to_string(),
        duration: "05:00".to_string(),
    }];
    let bytes = export_json(&records);
    let text = String::from_utf8(bytes)?;
    assert!(text.contains("视频一"));
    assert!(!text.contains("\\u"));
    assert!(text.contains("  \"bvid\""));
    let parsed: Vec<ExportRecord> = serde_json::from_str(&text)?;
    assert_eq!(parsed, records);
    Ok(())
}

#[test]
fn config_default_file_is_placeholder_only() -> TestResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.ini");
    let manager = ConfigManager::load(&path)?;
    assert!(path.exists());
    assert!(!manager.has_valid_config());
    assert!(manager.credential().is_none());

    let content = manager.export_config()?;
    assert!(content.contains("[Credential]"));
    assert!(content.contains("SESSDATA"));
    Ok(())
}

#[test]
fn config_saves_and_decodes_percent_encoded_sessdata() -> TestResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.ini");
    let mut manager = ConfigManager::load(&path)?;
    manager.save_credential(&Credential {
        sessdata: "abc%2Cdef".to_string(),
        bili_jct: "jct-token".to_string(),
        buvid3: "buvid-token".to_string(),
        dedeuserid: "12345".to_string(),
    })?;

    let reloaded = ConfigManager::load(&path)?;
    assert!(reloaded.has_valid_config());
    let credential = reloaded.credential().expect("credential");
    assert_eq!(credential.sessdata, "abc,def");
    assert_eq!(credential.uid()?, 12345);
    Ok(())
}

#[test]
fn config_import_replaces_content() -> TestResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("config.ini");
    let mut manager = ConfigManager::load(&path)?;
    manager.import_config(
        "[Credential]\nSESSDATA=s\nBILI_JCT=j\nBUVID3=b\nDEDEUSERID=777\n",
    )?;
    assert!(manager.has_valid_config());
    assert_eq!(manager.credential().expect("credential").dedeuserid, "777");
    assert!(manager.import_config("[Credential\nSESSDATA=s").is_err());
    Ok(())
}

#[tokio::test]
async fn collector_filters_by_cutoff_and_stops_early() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("mid", "42")
            .query_param("pn", "1")
            .query_param("ps", "50");
        then.status(200).json_body(page_body(vec![
            video_json("BV1aaa", "最新", 2000),
            video_json("BV1bbb", "较新", 1600),
        ]));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "2");
        then.status(200).json_body(page_body(vec![
            video_json("BV1ccc", "边界", 1500),
            video_json("BV1ddd", "过旧", 1400),
        ]));
    });
    let page3 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "3");
        then.status(200).json_body(page_body(vec![
            video_json("BV1eee", "过旧", 1200),
            video_json("BV1fff", "更旧", 1100),
        ]));
    });
    let page4 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "4");
        then.status(200).json_body(page_body(vec![]));
    });

    let client = test_client(&server);
    let collection = collect_since(&client, 42, 1500).await;

    // created >= cutoff 的记录全部保留，含边界值
    let bvids: Vec<&str> = collection
        .videos
        .iter()
        .map(|video| video.bvid.as_str())
        .collect();
    assert_eq!(bvids, vec!["BV1aaa", "BV1bbb", "BV1ccc"]);
    assert!(collection.videos.iter().all(|video| video.created >= 1500));
    assert!(!collection.fetch_degraded);

    // 第3页零命中即终止，第4页不再请求
    page1.assert();
    page2.assert();
    page3.assert();
    assert_eq!(page4.hits(), 0);
}

#[tokio::test]
async fn collector_honors_record_and_page_ceilings() {
    let server = MockServer::start();
    let mut page_mocks = Vec::new();
    for page in 1..=10u32 {
        let videos: Vec<Value> = (0..50)
            .map(|idx| video_json(&format!("BV{page}x{idx}"), "在窗口内", 10_000))
            .collect();
        let mock = server.mock(move |when, then| {
            when.method(GET)
                .path("/x/space/arc/search")
                .query_param("pn", page.to_string());
            then.status(200).json_body(page_body(videos.clone()));
        });
        page_mocks.push(mock);
    }
    let page11 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "11");
        then.status(200).json_body(page_body(vec![]));
    });

    let client = test_client(&server);
    let collection = collect_since(&client, 42, 0).await;

    assert_eq!(collection.len(), 500);
    assert_eq!(collection.pages_fetched, 10);
    for mock in &page_mocks {
        mock.assert();
    }
    assert_eq!(page11.hits(), 0);
}

#[tokio::test]
async fn collector_stops_at_page_ceiling() {
    let server = MockServer::start();
    let mut page_mocks = Vec::new();
    for page in 1..=20u32 {
        let videos: Vec<Value> = (0..10)
            .map(|idx| video_json(&format!("BV{page}x{idx}"), "在窗口内", 10_000))
            .collect();
        let mock = server.mock(move |when, then| {
            when.method(GET)
                .path("/x/space/arc/search")
                .query_param("pn", page.to_string());
            then.status(200).json_body(page_body(videos));
        });
        page_mocks.push(mock);
    }
    let page21 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "21");
        then.status(200).json_body(page_body(vec![
            video_json("BV21x0", "在窗口内", 10_000),
        ]));
    });

    let client = test_client(&server);
    let collection = collect_since(&client, 42, 0).await;

    // 每页都有命中且总量未到500，仍在第20页后停止翻页
    assert_eq!(collection.len(), 200);
    assert_eq!(collection.pages_fetched, 20);
    assert!(!collection.fetch_degraded);
    for mock in &page_mocks {
        mock.assert();
    }
    assert_eq!(page21.hits(), 0);
}

#[tokio::test]
async fn collector_degrades_fetch_failure_to_partial_result() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "1");
        then.status(200)
            .json_body(page_body(vec![video_json("BV1aaa", "正常", 2000)]));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "2");
        then.status(500);
    });

    let client = test_client(&server);
    let collection = collect_since(&client, 42, 1000).await;

    assert_eq!(collection.len(), 1);
    assert!(collection.fetch_degraded);
    // 只统计成功拉回的页，失败的那次请求不计入
    assert_eq!(collection.pages_fetched, 1);
    page1.assert();
    page2.assert();
}

#[tokio::test]
async fn collector_returns_empty_on_exhausted_user() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/x/space/arc/search");
        then.status(200).json_body(page_body(vec![]));
    });

    let client = test_client(&server);
    let collection = collect_since(&client, 42, 0).await;
    assert!(collection.is_empty());
    assert!(!collection.fetch_degraded);
    assert_eq!(collection.pages_fetched, 1);
}

#[tokio::test]
async fn validate_credential_reports_display_name() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/acc/info")
            .query_param("mid", "12345");
        then.status(200).json_body(json!({
            "code": 0,
            "data": {
                "mid": 12345,
                "name": "测试用户",
                "face": "https://i0.hdslb.com/face.jpg",
                "sign": "签名",
                "level": 6,
                "sex": "保密"
            }
        }));
    });

    let client = test_client(&server);
    let credential = Credential {
        sessdata: "s".to_string(),
        bili_jct: "j".to_string(),
        buvid3: "b".to_string(),
        dedeuserid: "12345".to_string(),
    };
    let check = validate_credential(&client, &credential).await;
    assert!(check.ok);
    assert_eq!(check.message, "测试用户");
}

#[tokio::test]
async fn validate_credential_surfaces_api_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/x/space/acc/info");
        then.status(200)
            .json_body(json!({ "code": -101, "message": "账号未登录" }));
    });

    let client = test_client(&server);
    let credential = Credential {
        sessdata: "s".to_string(),
        bili_jct: "j".to_string(),
        buvid3: "b".to_string(),
        dedeuserid: "12345".to_string(),
    };
    let check = validate_credential(&client, &credential).await;
    assert!(!check.ok);
    assert!(check.message.contains("验证失败"));

    let malformed = Credential {
        dedeuserid: "not-a-uid".to_string(),
        ..credential
    };
    let check = validate_credential(&client, &malformed).await;
    assert!(!check.ok);
}

#[tokio::test]
async fn session_fetch_resyncs_selection_and_exports() -> TestResult<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/x/space/acc/info");
        then.status(200).json_body(json!({
            "code": 0,
            "data": { "mid": 42, "name": "示例UP主", "level": 5 }
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "1");
        then.status(200).json_body(page_body(vec![
            video_json("BV1aaa", "游戏实况", 9_000_000_000),
            video_json("BV1bbb", "美食教程", 9_000_000_000),
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/x/space/arc/search")
            .query_param("pn", "2");
        then.status(200).json_body(page_body(vec![]));
    });

    let mut session = ScrapeSession::new(test_client(&server));
    session.fetch_videos(42, 1).await?;
    assert_eq!(session.videos().len(), 2);
    assert_eq!(session.selection().len(), 2);
    assert_eq!(session.profile().map(|p| p.name.as_str()), Some("示例UP主"));

    let matched = session.keyword_restrict(MatchField::Title, "游戏", MatchMode::Any);
    assert_eq!(matched, 1);
    assert_eq!(session.selection().count_selected(), 1);

    let dir = tempdir()?;
    let (path, count) = session.export_selected(dir.path())?;
    assert_eq!(count, 1);
    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("BV1aaa"));
    assert!(content.contains("游戏实况"));
    assert!(!content.contains("BV1bbb"));
    Ok(())
}

#[tokio::test]
async fn comments_stop_on_empty_page() -> TestResult<()> {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/v2/reply")
            .query_param("oid", "100")
            .query_param("pn", "1");
        then.status(200).json_body(json!({
            "code": 0,
            "data": {
                "replies": [
                    {
                        "rpid": 1,
                        "like": 10,
                        "rcount": 2,
                        "ctime": 1700000000,
                        "member": { "mid": 9, "uname": "评论者", "sex": "男",
                                    "level_info": { "current_level": 4 } },
                        "content": { "message": "第一条评论" }
                    }
                ]
            }
        }));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/x/v2/reply")
            .query_param("pn", "2");
        then.status(200).json_body(json!({ "code": 0, "data": { "replies": [] } }));
    });

    let client = test_client(&server);
    let comments = client.get_video_comments(100, 5).await?;
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].username, "评论者");
    assert_eq!(comments[0].like_count, 10);
    page1.assert();
    page2.assert();
    Ok(())
}

#[test]
fn image_url_normalization() {
    assert_eq!(
        normalize_image_url("http://i0.hdslb.com/a.jpg"),
        "https://i0.hdslb.com/a.jpg"
    );
    assert_eq!(
        normalize_image_url("//i0.hdslb.com/a.jpg"),
        "https://i0.hdslb.com/a.jpg"
    );
    assert_eq!(
        normalize_image_url("  https://i0.hdslb.com/a.jpg "),
        "https://i0.hdslb.com/a.jpg"
    );
}
