use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// One catalogue entry as written into a test XML file
#[derive(Debug, Clone)]
pub struct CatalogueEntry {
    pub audio_filename: String,
    pub isrc: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl CatalogueEntry {
    pub fn new(audio_filename: &str) -> Self {
        Self {
            audio_filename: audio_filename.to_string(),
            isrc: None,
            title: None,
            artist: None,
        }
    }

    pub fn isrc(mut self, isrc: &str) -> Self {
        self.isrc = Some(isrc.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }

    /// Release-message style document with plain element names
    pub fn to_release_xml(&self) -> String {
        let mut body = format!(
            "    <SoundRecording>\n      <FileName>{}</FileName>\n",
            self.audio_filename
        );
        if let Some(isrc) = &self.isrc {
            body.push_str(&format!("      <ISRC>{}</ISRC>\n", isrc));
        }
        if let Some(title) = &self.title {
            body.push_str(&format!("      <Title>{}</Title>\n", title));
        }
        if let Some(artist) = &self.artist {
            body.push_str(&format!("      <ArtistName>{}</ArtistName>\n", artist));
        }
        body.push_str("    </SoundRecording>\n");

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Release>\n  <ResourceList>\n{}  </ResourceList>\n</Release>\n",
            body
        )
    }

    /// Attribute style document in a default namespace
    pub fn to_attribute_xml(&self) -> String {
        let mut attributes = format!("filename=\"{}\"", self.audio_filename);
        if let Some(isrc) = &self.isrc {
            attributes.push_str(&format!(" isrc=\"{}\"", isrc));
        }
        if let Some(title) = &self.title {
            attributes.push_str(&format!(" title=\"{}\"", title));
        }
        if let Some(artist) = &self.artist {
            attributes.push_str(&format!(" artist=\"{}\"", artist));
        }
        format!(
            "<catalogue xmlns=\"urn:example:catalogue\"><track {}/></catalogue>",
            attributes
        )
    }
}

pub const MALFORMED_XML: &str = "<?xml version=\"1.0\"?>\n<Release><SoundRecording><FileName>broken.wav</FileName>";

/// Write an XML file, creating parent directories
pub async fn create_test_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await
}

/// Directory with `valid` well-formed catalogue files (`track01.wav`, ...)
/// and `malformed` unparseable ones, spread across a nested layout
pub async fn create_catalogue_dir(valid: usize, malformed: usize) -> std::io::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    for i in 1..=valid {
        let entry = CatalogueEntry::new(&format!("track{:02}.wav", i))
            .isrc(&format!("USABC24000{:02}", i))
            .title(&format!("Song {}", i))
            .artist("The Testers");
        let subdir = if i % 2 == 0 { "batch_a" } else { "batch_b/nested" };
        create_test_file(
            &root.join(subdir).join(format!("track{:02}.xml", i)),
            &entry.to_release_xml(),
        )
        .await?;
    }

    for i in 1..=malformed {
        create_test_file(&root.join(format!("broken{:02}.xml", i)), MALFORMED_XML).await?;
    }

    fs::write(root.join("notes.txt"), "not a catalogue file").await?;

    Ok(temp_dir)
}

/// Storage paths for `track01.wav` .. `trackNN.wav`
pub fn storage_paths(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("gs://audio-bucket/masters/track{:02}.wav", i))
        .collect()
}

/// Write a CSV manifest with `path` and `size` columns
pub fn write_csv_manifest(dir: &Path, name: &str, paths: &[String]) -> PathBuf {
    let mut content = String::from("path,size\n");
    for (i, path) in paths.iter().enumerate() {
        content.push_str(&format!("{},{}\n", path, 1000 + i));
    }
    let manifest = dir.join(name);
    std::fs::write(&manifest, content).unwrap();
    manifest
}

/// Write a JSON manifest holding `value`
pub fn write_json_manifest(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let manifest = dir.join(name);
    std::fs::write(&manifest, serde_json::to_string_pretty(value).unwrap()).unwrap();
    manifest
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Parse a CSV file into header and rows
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}
