use super::*;
use chrono::{Datelike, Timelike};

const MANIFEST_JSON: &str = r##"{
   "schemaVersion": 1,
   "name": "library/alpine",
   "tag": "3.6",
   "architecture": "amd64",
   "fsLayers": [
      { "blobSum": "sha256:a3ed95caeb02ffe68cdd9fd84406680ae93d633cb16422d00e8a7c22955b46d4" },
      { "blobSum": "sha256:88286f41530e93dffd4b964e1db22ce4939fffa4a4c665dab8591fbab03d4926" }
   ],
   "history": [
      { "v1Compatibility": "{\"id\":\"d3cb\",\"parent\":\"9b2c\",\"created\":\"2017-06-27T18:42:16.849872208Z\",\"docker_version\":\"17.03.1-ce\",\"container_config\":{\"Cmd\":[\"/bin/sh\",\"-c\",\"#(nop) \",\"CMD [\\\"/bin/sh\\\"]\"]},\"os\":\"linux\",\"throwaway\":true}" },
      { "v1Compatibility": "{\"id\":\"9b2c\",\"created\":\"2017-06-27T18:42:16.484425743Z\",\"container_config\":{\"Cmd\":[\"/bin/sh\",\"-c\",\"#(nop) ADD file:4583e12bf5caec4 in / \"]}}" }
   ],
   "signatures": [
      { "header": { "alg": "ES256" }, "signature": "abc", "protected": "def" }
   ]
}"##;

#[test]
fn test_manifest_from_slice() {
    let manifest = Manifest::from_slice(MANIFEST_JSON.as_bytes()).unwrap();

    assert_eq!(manifest.schema_version, 1);
    assert_eq!(manifest.name, "library/alpine");
    assert_eq!(manifest.tag, "3.6");
    assert_eq!(manifest.architecture, "amd64");
    assert_eq!(manifest.fs_layers.len(), 2);
    assert_eq!(manifest.history.len(), 2);
    assert_eq!(manifest.signatures.len(), 1);
}

#[test]
fn test_manifest_blob_sums_preserve_order() {
    let manifest = Manifest::from_slice(MANIFEST_JSON.as_bytes()).unwrap();

    let blobs = manifest.blob_sums();
    assert!(blobs[0].starts_with("sha256:a3ed"));
    assert!(blobs[1].starts_with("sha256:8828"));
}

#[test]
fn test_manifest_from_invalid_json_fails() {
    let result = Manifest::from_slice(b"<html>not a manifest</html>");

    assert!(matches!(
        result.unwrap_err(),
        KlippyError::ManifestDecode { .. }
    ));
}

#[test]
fn test_manifest_schema_2_is_rejected() {
    let body = br#"{"schemaVersion":2,"mediaType":"application/vnd.docker.distribution.manifest.v2+json",
        "config":{"digest":"sha256:abc"},"layers":[{"digest":"sha256:def"}]}"#;

    match Manifest::from_slice(body).unwrap_err() {
        KlippyError::ManifestDecode {
            message, source, ..
        } => {
            assert!(message.contains("schemaVersion 2"));
            assert!(source.is_none());
        }
        other => panic!("Expected ManifestDecode error, got {:?}", other),
    }
}

#[test]
fn test_manifest_without_schema_version_is_rejected() {
    let result = Manifest::from_slice(b"{}");

    assert!(matches!(
        result.unwrap_err(),
        KlippyError::ManifestDecode { .. }
    ));
}

#[test]
fn test_manifest_missing_fields_default() {
    let manifest = Manifest::from_slice(br#"{"schemaVersion":1}"#).unwrap();

    assert!(manifest.fs_layers.is_empty());
    assert!(manifest.history.is_empty());
    assert!(manifest.name.is_empty());
}

#[test]
fn test_decode_layers_reads_inner_documents() {
    let manifest = Manifest::from_slice(MANIFEST_JSON.as_bytes()).unwrap();

    let layers = manifest.decode_layers().unwrap();
    assert_eq!(layers.len(), 2);

    let first = &layers[0];
    assert_eq!(first.id.as_deref(), Some("d3cb"));
    assert_eq!(first.parent.as_deref(), Some("9b2c"));
    assert_eq!(first.docker_version.as_deref(), Some("17.03.1-ce"));
    assert_eq!(first.os.as_deref(), Some("linux"));
    assert!(first.throwaway);
    assert_eq!(
        first.container_config.cmd(),
        &["/bin/sh", "-c", "#(nop) ", "CMD [\"/bin/sh\"]"]
    );

    let created = first.created.unwrap();
    assert_eq!(created.year(), 2017);
    assert_eq!(created.hour(), 18);
}

#[test]
fn test_decode_layers_fails_fast_on_bad_entry() {
    let mut manifest = Manifest::from_slice(MANIFEST_JSON.as_bytes()).unwrap();
    manifest.history[1].v1_compatibility = "{broken".to_string();

    match manifest.decode_layers().unwrap_err() {
        KlippyError::HistoryDecode { layer, .. } => assert_eq!(layer, 1),
        other => panic!("Expected HistoryDecode error, got {:?}", other),
    }
}

#[test]
fn test_layer_build_info_null_cmd_is_empty() {
    let info = LayerBuildInfo::decode(0, r#"{"container_config":{"Cmd":null}}"#).unwrap();
    assert!(info.container_config.cmd().is_empty());

    let info = LayerBuildInfo::decode(0, "{}").unwrap();
    assert!(info.container_config.cmd().is_empty());
    assert!(info.created.is_none());
}
