use std::path::Path;

use catalogue_match::{CatalogueError, DocumentProcessor};

fn process(xml: &str) -> catalogue_match::Result<catalogue_match::XmlMetadata> {
    DocumentProcessor::new().process_str(Path::new("fixture.xml"), xml)
}

#[test]
fn test_ddex_style_release_message() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ern:NewReleaseMessage xmlns:ern="http://ddex.net/xml/ern/43" MessageSchemaVersionId="ern/43">
  <ResourceList>
    <SoundRecording>
      <ResourceReference>A1</ResourceReference>
      <ISRC>GBDUW0000059</ISRC>
      <DisplayTitleText>Ignored</DisplayTitleText>
      <Title>Midnight Drive</Title>
      <DisplayArtist>
        <ArtistName>Night Shift</ArtistName>
      </DisplayArtist>
      <TechnicalDetails>
        <File>
          <FileName>A1_midnight_drive.wav</FileName>
        </File>
      </TechnicalDetails>
    </SoundRecording>
  </ResourceList>
</ern:NewReleaseMessage>"#;

    let metadata = process(xml).unwrap();

    assert_eq!(metadata.audio_filename, "A1_midnight_drive.wav");
    assert_eq!(metadata.isrc.as_deref(), Some("GBDUW0000059"));
    assert_eq!(metadata.track_title.as_deref(), Some("Midnight Drive"));
    assert_eq!(metadata.artist.as_deref(), Some("Night Shift"));
}

#[test]
fn test_fully_namespaced_document() {
    let xml = r#"<catalog xmlns="urn:example:catalog">
  <recording>
    <FileName>ns_track.wav</FileName>
    <ISRC>USNS10000001</ISRC>
    <TrackTitle>Namespaced</TrackTitle>
    <Performer><Name>Anon</Name></Performer>
  </recording>
</catalog>"#;

    let metadata = process(xml).unwrap();

    assert_eq!(metadata.audio_filename, "ns_track.wav");
    assert_eq!(metadata.isrc.as_deref(), Some("USNS10000001"));
    assert_eq!(metadata.track_title.as_deref(), Some("Namespaced"));
    assert_eq!(metadata.artist.as_deref(), Some("Anon"));
}

#[test]
fn test_keyword_fallback_requires_wav_content() {
    let xml = r#"<asset>
  <masterFilename>cover.jpg</masterFilename>
  <sourceFilename>session/take3.WAV</sourceFilename>
  <isrcCode>FRXXX1900001</isrcCode>
</asset>"#;

    let metadata = process(xml).unwrap();

    assert_eq!(metadata.audio_filename, "session/take3.WAV");
    assert_eq!(metadata.isrc.as_deref(), Some("FRXXX1900001"));
    assert_eq!(metadata.track_title, None);
}

#[test]
fn test_attribute_fallback_for_filename() {
    let xml = r#"<asset><media audioRef="mix_final.wav" kind="audio"/></asset>"#;

    let metadata = process(xml).unwrap();

    assert_eq!(metadata.audio_filename, "mix_final.wav");
}

#[test]
fn test_document_without_filename_is_rejected() {
    let xml = r#"<Release><ISRC>USX</ISRC><Title>No file</Title></Release>"#;

    match process(xml) {
        Err(CatalogueError::MissingIdentifier { file }) => {
            assert_eq!(file, Path::new("fixture.xml"))
        }
        other => panic!("Expected MissingIdentifier, got {:?}", other),
    }
}

#[test]
fn test_malformed_document_is_parse_error() {
    let result = process("<Release><FileName>a.wav</Release>");

    assert!(matches!(result, Err(CatalogueError::XmlParse { .. })));
}

#[test]
fn test_empty_winning_element_yields_absent_value() {
    let xml = r#"<Release><FileName>a.wav</FileName><ISRC/><Isrc2>SHOULD-NOT-WIN</Isrc2></Release>"#;

    let metadata = process(xml).unwrap();

    assert_eq!(metadata.isrc, None);
}
