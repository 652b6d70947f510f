//! Enrichment of metadata documents with data from the Curse host

use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, info_span, instrument};

use crate::curse::{ModRecord, ModSource, ModVersion};
use crate::error::Result;
use crate::metadata::{FieldsExt, MetadataDocument};
use crate::transform::Transformer;
use crate::transform::escape::escape_url;
use crate::transform::license::normalize;

/// `kref` source handled by this transformer, also its resources key
pub const SERVICE: &str = "curse";

const GAME_VERSION_KEYS: [&str; 3] = ["ksp_version_min", "ksp_version_max", "ksp_version"];

/// Merge a resolved mod into `document` and hand the same document back
///
/// Does nothing unless the document's `kref` points at [`SERVICE`]. Fields the
/// record does not know are left untouched.
pub fn merge<'a>(
    document: &'a mut MetadataDocument,
    record: &ModRecord,
    version: &ModVersion,
) -> Result<&'a mut MetadataDocument> {
    if !targets_service(document) {
        return Ok(document);
    }

    // Only pre-fill version info if there's none already.
    if !GAME_VERSION_KEYS.iter().any(|key| document.has_value(key)) {
        if let Some(game_version) = &version.target_game_version {
            debug!("Writing ksp_version: {}", game_version);
            document.set_always("ksp_version", game_version.to_string());
        }
    }

    fill(document, "name", record.name());
    fill(document, "abstract", record.short_description());
    fill(
        document,
        "version",
        version.friendly_version.as_ref().map(ToString::to_string),
    );
    fill(document, "author", record.author());
    document.set_if_absent("download", version.download_text.as_str());
    fill(document, "license", record.license().map(normalize));

    let resources = document.object_mut("resources")?;
    if let Some(homepage) = escape_url(record.website()) {
        resources.set_if_absent("homepage", homepage);
    }
    if let Some(repository) = escape_url(record.source_code()) {
        resources.set_if_absent("repository", repository);
    }
    resources.set_always(SERVICE, record.page_url().as_str());
    if let Some(screenshot) = escape_url(record.background()) {
        resources.set_if_absent("x_screenshot", screenshot);
    }

    Ok(document)
}

fn targets_service(document: &MetadataDocument) -> bool {
    document
        .reference()
        .is_some_and(|reference| reference.source == SERVICE)
}

fn fill<V: Into<serde_json::Value>>(document: &mut MetadataDocument, key: &str, value: Option<V>) {
    if let Some(value) = value {
        document.set_if_absent(key, value);
    }
}

/// Looks up documents referencing [`SERVICE`] and merges the result in
#[derive(Clone, Debug)]
pub struct CurseTransformer<S> {
    source: S,
    span: Span,
}

impl<S: ModSource> CurseTransformer<S> {
    pub fn new(source: S) -> Self {
        Self::with_span(source, info_span!("curse_transformer"))
    }

    /// Create a transformer whose events are recorded under `span`
    pub fn with_span(source: S, span: Span) -> Self {
        Self { source, span }
    }
}

impl<S: ModSource + Sync> Transformer for CurseTransformer<S> {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[instrument(parent = &self.span, skip_all)]
    async fn transform(
        &self,
        mut document: MetadataDocument,
        cancel: &CancellationToken,
    ) -> Result<MetadataDocument> {
        let Some(reference) = document
            .reference()
            .filter(|reference| reference.source == SERVICE)
        else {
            return Ok(document);
        };

        info!("Executing Curse transformation with {}", reference);
        debug!("Input metadata: {}", document);

        let record = self.source.get_mod(&reference.id, cancel).await?;
        let latest = record.latest()?;
        info!(
            "Found Curse mod {} {}",
            record,
            latest
                .friendly_version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        );

        merge(&mut document, &record, latest)?;

        debug!("Transformed metadata: {}", document);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curse::{CurseApi, CurseConfig, FriendlyVersion, GameVersion};
    use crate::error::Error;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use url::Url;

    fn page_url() -> Url {
        Url::parse("http://kerbal.curseforge.com/projects/220221-test-mod").unwrap()
    }

    fn full_record() -> ModRecord {
        let mut version = ModVersion::new(
            2,
            Url::parse("http://kerbal.curseforge.com/projects/220221-test-mod/files/2").unwrap(),
        );
        version.target_game_version = Some("1.0.5".parse::<GameVersion>().unwrap());
        version.friendly_version = Some("1.2.0".parse::<FriendlyVersion>().unwrap());

        ModRecord::builder(page_url())
            .name("Test Mod")
            .short_description("Does things")
            .author("Someone")
            .license("GPLv2")
            .website("example.com/[docs]")
            .source_code("https://github.com/someone/test mod")
            .background("http://img.example.com/bg.png")
            .version(version)
            .default_version_id(2)
            .build()
            .unwrap()
    }

    fn curse_doc() -> MetadataDocument {
        MetadataDocument::from_json(json!({
            "spec_version": 1,
            "identifier": "TestMod",
            "kref": {"source": "curse", "id": "220221"}
        }))
        .unwrap()
    }

    fn merged(mut document: MetadataDocument, record: &ModRecord) -> MetadataDocument {
        let latest = record.latest().unwrap();
        merge(&mut document, record, latest).unwrap();
        document
    }

    #[test]
    fn test_merge_fills_everything() {
        let document = merged(curse_doc(), &full_record());

        assert_eq!(
            document.into_json(),
            json!({
                "spec_version": 1,
                "identifier": "TestMod",
                "kref": {"source": "curse", "id": "220221"},
                "ksp_version": "1.0.5",
                "name": "Test Mod",
                "abstract": "Does things",
                "version": "1.2.0",
                "author": "Someone",
                "download": "http://kerbal.curseforge.com/projects/220221-test-mod/files/2",
                "license": "GPL-2.0",
                "resources": {
                    "homepage": "http://example.com/%5Bdocs%5D",
                    "repository": "https://github.com/someone/test%20mod",
                    "curse": "http://kerbal.curseforge.com/projects/220221-test-mod",
                    "x_screenshot": "http://img.example.com/bg.png"
                }
            })
        );
    }

    #[test]
    fn test_merge_returns_the_document() {
        let record = full_record();
        let mut document = curse_doc();

        let returned = merge(&mut document, &record, record.latest().unwrap()).unwrap();
        returned.set_always("x_touched", true);

        assert_eq!(document.get("name"), Some(&json!("Test Mod")));
        assert_eq!(document.get("x_touched"), Some(&json!(true)));
    }

    #[test]
    fn test_merge_writes_download_unescaped() {
        let text = "http://kerbal.curseforge.com/download/My Mod 1.0.zip";
        let version = ModVersion::scraped(0, Url::parse(text).unwrap(), text);
        let record = ModRecord::builder(page_url())
            .version(version)
            .build()
            .unwrap();

        let document = merged(curse_doc(), &record);

        assert_eq!(document.get("download"), Some(&json!(text)));
    }

    #[test]
    fn test_merge_keeps_author_values() {
        let document = MetadataDocument::from_json(json!({
            "kref": {"source": "curse", "id": "220221"},
            "name": "My Name",
            "license": "MIT",
            "ksp_version_min": "1.0.0",
            "resources": {"homepage": "http://mine.example.com", "curse": "http://stale"}
        }))
        .unwrap();

        let document = merged(document, &full_record());

        assert_eq!(document.get("name"), Some(&json!("My Name")));
        assert_eq!(document.get("license"), Some(&json!("MIT")));
        assert!(document.get("ksp_version").is_none());
        let resources = document.get("resources").unwrap();
        assert_eq!(resources["homepage"], json!("http://mine.example.com"));
        assert_eq!(
            resources["curse"],
            json!("http://kerbal.curseforge.com/projects/220221-test-mod")
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let record = full_record();
        let once = merged(curse_doc(), &record);
        let twice = merged(once.clone(), &record);

        assert_eq!(once.to_string(), twice.to_string());
    }

    #[test]
    fn test_merge_skips_unknown_fields() {
        let download = Url::parse("http://kerbal.curseforge.com/download/42").unwrap();
        let record = ModRecord::builder(page_url())
            .version(ModVersion::new(42, download))
            .default_version_id(42)
            .build()
            .unwrap();

        let document = merged(curse_doc(), &record);

        for key in ["name", "abstract", "version", "author", "license", "ksp_version"] {
            assert!(document.get(key).is_none(), "{} should not be written", key);
        }
        assert_eq!(
            document.get("download"),
            Some(&json!("http://kerbal.curseforge.com/download/42"))
        );
        assert_eq!(
            document.get("resources"),
            Some(&json!({"curse": "http://kerbal.curseforge.com/projects/220221-test-mod"}))
        );
    }

    #[test]
    fn test_merge_ignores_other_sources() {
        let record = full_record();
        for value in [
            json!({"kref": {"source": "spacedock", "id": "1"}, "name": "x"}),
            json!({"identifier": "NoKref"}),
        ] {
            let original = MetadataDocument::from_json(value).unwrap();
            let document = merged(original.clone(), &record);
            assert_eq!(document, original);
        }
    }

    struct FixedSource(ModRecord);

    impl ModSource for FixedSource {
        async fn get_mod(&self, _mod_id: &str, _cancel: &CancellationToken) -> Result<ModRecord> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_transform_passes_through_other_sources() {
        let transformer = CurseTransformer::new(FixedSource(full_record()));
        let original =
            MetadataDocument::from_json(json!({"kref": {"source": "github", "id": "a/b"}})).unwrap();

        let document = transformer
            .transform(original.clone(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(document, original);
        assert_eq!(transformer.name(), "curse");
    }

    #[tokio::test]
    async fn test_transform_dangling_default_version() {
        let record = full_record().to_builder().default_version_id(99).build().unwrap();
        let transformer = CurseTransformer::new(FixedSource(record));

        let result = transformer
            .transform(curse_doc(), &CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(Error::VersionNotFound { version_id: 99, .. })
        ));
    }

    /// Real scraping, with the license layered in the way a richer source would supply it
    struct LicensedCurse(CurseApi);

    impl ModSource for LicensedCurse {
        async fn get_mod(&self, mod_id: &str, cancel: &CancellationToken) -> Result<ModRecord> {
            let record = self.0.get_mod(mod_id, cancel).await?;
            record.to_builder().license("GPLv3").build()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_keeps_download_spelling() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/projects/9")
            .with_status(200)
            .create_async()
            .await;
        let _files = server
            .mock("GET", "/projects/9/files/")
            .with_status(200)
            .with_body(
                r#"<html><body><div id="content"><section><div><div>
                <div></div>
                <div><table><tbody><tr><td>R</td><td><div><div></div><div>
                  <a data-name="My Mod" href="/download/My Mod 1.0.zip">My Mod</a>
                </div></div></td></tr></tbody></table></div>
                </div></div></section></div></body></html>"#,
            )
            .create_async()
            .await;
        let _download = server
            .mock("GET", "/download/My%20Mod%201.0.zip")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let config = CurseConfig::builder()
            .base_url(format!("{}/projects/", server.url()))
            .build();
        let transformer = CurseTransformer::new(CurseApi::new(config).unwrap());
        let input =
            MetadataDocument::from_json(json!({"kref": {"source": "curse", "id": "9"}})).unwrap();

        let output = transformer
            .transform(input, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            output.get("download"),
            Some(&json!(format!("{}/download/My Mod 1.0.zip", server.url())))
        );
    }

    #[tokio::test]
    async fn test_end_to_end_against_mock_host() {
        let mut server = Server::new_async().await;
        let _seed = server
            .mock("GET", "/projects/123")
            .with_status(302)
            .with_header("location", "/projects/123-test-mod?utm=x")
            .expect(1)
            .create_async()
            .await;
        let _page = server
            .mock("GET", "/projects/123-test-mod")
            .match_query(Matcher::Any)
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let _files = server
            .mock("GET", "/projects/123-test-mod/files/")
            .with_status(200)
            .with_body(
                r#"<html><body><div id="content"><section><div><div>
                <div></div>
                <div><table><tbody><tr><td>R</td><td><div><div></div><div>
                  <a data-name="Test Mod 1.0" href="/download/42">Test Mod 1.0</a>
                </div></div></td></tr></tbody></table></div>
                </div></div></section></div></body></html>"#,
            )
            .expect(1)
            .create_async()
            .await;
        let _download = server
            .mock("GET", "/download/42")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let config = CurseConfig::builder()
            .base_url(format!("{}/projects/", server.url()))
            .build();
        let transformer = CurseTransformer::new(LicensedCurse(CurseApi::new(config).unwrap()));
        let input =
            MetadataDocument::from_json(json!({"kref": {"source": "curse", "id": "123"}})).unwrap();

        let output = transformer
            .transform(input, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.get("license"), Some(&json!("GPL-3.0")));
        assert_eq!(
            output.get("download"),
            Some(&json!(format!("{}/download/42", server.url())))
        );
        assert_eq!(
            output.get("resources"),
            Some(&json!({"curse": format!("{}/projects/123-test-mod", server.url())}))
        );
    }
}
