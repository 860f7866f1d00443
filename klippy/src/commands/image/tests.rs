use super::*;
use libklippy::ImageReference;
use libklippy::history::{CONTINUATION, CommandKind};

fn command(layer: usize, kind: CommandKind, text: &str) -> FormattedCommand {
    FormattedCommand {
        layer,
        kind,
        text: text.to_string(),
    }
}

#[test]
fn test_tag_list_format_pretty() {
    let tags = TagList {
        reference: "library/alpine".to_string(),
        tags: vec!["3.19".to_string(), "latest".to_string()],
    };

    assert_eq!(tags.format_pretty(false), "\t3.19\n\tlatest");
}

#[test]
fn test_tag_list_format_pretty_empty() {
    let tags = TagList {
        reference: "team/app".to_string(),
        tags: vec![],
    };

    assert!(tags.format_pretty(false).contains("No tags found"));
}

#[test]
fn test_tag_list_serialization() {
    let tags = TagList {
        reference: "team/app".to_string(),
        tags: vec!["v1".to_string()],
    };

    let json = serde_json::to_string(&tags).unwrap();
    assert_eq!(json, r#"{"reference":"team/app","tags":["v1"]}"#);
}

#[test]
fn test_command_list_format_pretty_table() {
    let commands = CommandList {
        reference: "team/app".to_string(),
        commands: vec![
            command(0, CommandKind::Metadata, r#"CMD ["nginx"]"#),
            command(
                1,
                CommandKind::Run,
                &format!("apt-get update {} apt-get clean", CONTINUATION),
            ),
        ],
    };

    let table = commands.format_pretty(false);
    assert!(table.contains("LAYER"));
    assert!(table.contains("COMMAND"));
    assert!(table.contains(r#"CMD ["nginx"]"#));
    assert!(table.contains("apt-get clean"));
    assert!(!table.contains('\u{1b}'));
}

#[test]
fn test_command_list_format_pretty_colored() {
    let commands = CommandList {
        reference: "team/app".to_string(),
        commands: vec![command(0, CommandKind::Metadata, "LABEL a=b")],
    };

    assert!(commands.format_pretty(true).contains("\u{1b}[31m"));
}

#[test]
fn test_command_list_serialization() {
    let commands = CommandList {
        reference: "team/app".to_string(),
        commands: vec![command(2, CommandKind::Run, "make")],
    };

    let json: serde_json::Value = serde_json::to_value(&commands).unwrap();
    assert_eq!(json["commands"][0]["layer"], 2);
    assert_eq!(json["commands"][0]["kind"], "run");
    assert_eq!(json["commands"][0]["text"], "make");
}

#[test]
fn test_overview_format_pretty() {
    let overview = ImageOverview {
        reference: ImageReference::new("https://registry-1.docker.io", "library/alpine", "3.6"),
        name: "library/alpine".to_string(),
        tag: "3.6".to_string(),
        architecture: "amd64".to_string(),
        schema_version: 1,
        layers: vec!["sha256:aaa".to_string(), "sha256:bbb".to_string()],
    };

    let output = overview.format_pretty(false);
    assert!(output.contains("Name:   library/alpine"));
    assert!(output.contains("Arch:   amd64"));
    assert!(output.contains("Tag:    3.6"));
    assert!(output.contains("Layer [0]:  sha256:aaa"));
    assert!(output.contains("Layer [1]:  sha256:bbb"));
}

#[test]
fn test_access_report_format_pretty() {
    let report = AccessReport {
        reference: ImageReference::new("https://registry.example.com", "team/app", "v1"),
        api_version: None,
        token_issued: true,
    };

    let output = report.format_pretty(false);
    assert!(output.contains("registry.example.com/team/app:v1 is accessible"));
    assert!(output.contains("unknown"));
    assert!(output.contains("issued"));
}

#[tokio::test]
async fn test_fetch_tags_from_mock_registry() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/v2/team/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"team/app","tags":["b","a"]}"#)
        .create_async()
        .await;

    let klippy = Klippy::new().unwrap();
    let reference = format!("{}/team/app", server.url());
    let tags = fetch_tags(&klippy, &reference).await.unwrap();

    assert_eq!(tags.reference, reference);
    assert_eq!(tags.tags, vec!["b", "a"]);
}

#[tokio::test]
async fn test_fetch_commands_propagates_registry_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/v2/team/app/manifests/v9")
        .with_status(404)
        .create_async()
        .await;

    let klippy = Klippy::new().unwrap();
    let reference = format!("{}/team/app:v9", server.url());
    let err = fetch_commands(&klippy, &reference).await.unwrap_err();

    assert!(err.to_string().contains("team/app"));
}
