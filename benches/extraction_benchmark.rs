use catalogue_match::extractor::{FieldKind, extract};
use catalogue_match::{DocumentProcessor, Manifest, ManifestHandler};
use divan::Bencher;
use roxmltree::Document;
use serde_json::json;
use std::path::Path;

fn main() {
    divan::main();
}

const STRUCTURED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Release>
  <ResourceList>
    <SoundRecording>
      <FileName>track01.wav</FileName>
      <ISRC>USABC2400001</ISRC>
      <Title>Song 1</Title>
      <ArtistName>The Testers</ArtistName>
    </SoundRecording>
  </ResourceList>
</Release>"#;

const FALLBACK_XML: &str = r#"<asset xmlns="urn:example:asset">
  <meta kind="cover" uri="cover.jpg"/>
  <meta kind="audio" sourceFile="masters/track01.wav"/>
  <isrcCode>USABC2400001</isrcCode>
  <creatorName>The Testers</creatorName>
</asset>"#;

#[divan::bench]
fn process_structured_document() {
    DocumentProcessor::new()
        .process_str(Path::new("bench.xml"), divan::black_box(STRUCTURED_XML))
        .unwrap();
}

#[divan::bench]
fn process_fallback_document() {
    DocumentProcessor::new()
        .process_str(Path::new("bench.xml"), divan::black_box(FALLBACK_XML))
        .unwrap();
}

#[divan::bench(args = FieldKind::ALL)]
fn extract_single_field(bencher: Bencher, kind: FieldKind) {
    let document = Document::parse(FALLBACK_XML).unwrap();

    bencher.bench_local(|| extract(document.root_element(), divan::black_box(kind)));
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn build_index(bencher: Bencher, rows: usize) {
    let manifest = Manifest::List(
        (0..rows)
            .map(|i| json!({"path": format!("gs://bucket/masters/track{:05}.wav", i)}))
            .collect(),
    );

    bencher.bench_local(|| ManifestHandler::new(manifest.clone()));
}
