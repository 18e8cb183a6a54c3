use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

enum Format {
    Xml,
    GzippedXml,
}

fn format_of(path: &Path) -> Result<Format> {
    let name = path.to_string_lossy();
    if name.ends_with(".xml.gz") {
        Ok(Format::GzippedXml)
    } else if name.ends_with(".xml") {
        Ok(Format::Xml)
    } else {
        Err(Error::UnsupportedFormat(path.to_path_buf()))
    }
}

pub fn read_from_file<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let format = format_of(path)?;
    info!("Starting to read file at: {path:?}");
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let buffered_reader = BufReader::new(file);

    let result = match format {
        Format::GzippedXml => {
            // use full name, to avoid ambiguity
            let decoder = flate2::read::GzDecoder::new(buffered_reader);
            deserialize(BufReader::new(decoder))
        }
        Format::Xml => deserialize(buffered_reader),
    };
    info!("Finished reading file at: {path:?}");
    result
}

pub fn read_from_str<T>(xml: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    deserialize(xml.as_bytes())
}

fn deserialize<T, R>(reader: R) -> Result<T>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut deserializer = quick_xml::de::Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| Error::Xml {
        path: e.path().to_string(),
        message: e.into_inner().to_string(),
    })
}

/// Serializes `value` with indentation. The header is written verbatim in front of the root
/// element.
pub fn write_to_string<T: Serialize>(value: &T, header: &str) -> Result<String> {
    let mut buffer = String::from(header);
    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    serializer.indent(' ', 4);
    value
        .serialize(serializer)
        .map_err(|e| Error::XmlWrite(e.to_string()))?;
    buffer.push('\n');
    Ok(buffer)
}

pub fn write_to_file<T: Serialize>(value: &T, path: &Path, header: &str) -> Result<()> {
    let format = format_of(path)?;
    if let Some(prefix) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(prefix).map_err(|e| Error::io(prefix, e))?;
    }
    let content = write_to_string(value, header)?;

    info!("Starting to write file to: {path:?}");
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let file_writer = BufWriter::new(file);
    match format {
        Format::GzippedXml => {
            let mut compressor = flate2::write::GzEncoder::new(file_writer, Compression::fast());
            compressor
                .write_all(content.as_bytes())
                .map_err(|e| Error::io(path, e))?;
            compressor.finish().map_err(|e| Error::io(path, e))?;
        }
        Format::Xml => {
            let mut file_writer = file_writer;
            file_writer
                .write_all(content.as_bytes())
                .map_err(|e| Error::io(path, e))?;
            file_writer.flush().map_err(|e| Error::io(path, e))?;
        }
    }
    info!("Finished writing file to: {path:?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde::{Deserialize, Serialize};

    use crate::error::Error;
    use crate::io::xml::{read_from_file, read_from_str, write_to_file, XML_HEADER};

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    #[serde(rename = "edges")]
    struct IOEdges {
        #[serde(rename = "edge", default)]
        edges: Vec<IOEdge>,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct IOEdge {
        #[serde(rename = "@id")]
        id: String,
        #[serde(rename = "@length")]
        length: f64,
    }

    // only testing the invalid ending here, since the other cases
    // are implicitly tested when routes and networks are loaded
    #[test]
    fn unsupported_ending() {
        let result = read_from_file::<IOEdges>(Path::new("file-path-with-unsupported.ending"));
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_file() {
        let result = read_from_file::<IOEdges>(Path::new("./does/not/exist.xml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn error_reports_field_path() {
        let xml = "<edges><edge id=\"a\" length=\"not-a-number\"/></edges>";
        let result = read_from_str::<IOEdges>(xml);
        match result {
            Err(Error::Xml { path, .. }) => assert!(path.contains("edge"), "path was {path}"),
            other => panic!("expected xml error, got {other:?}"),
        }
    }

    #[test]
    fn write_read_gzipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("edges.xml.gz");
        let edges = IOEdges {
            edges: vec![IOEdge {
                id: String::from("420496529#1"),
                length: 12.5,
            }],
        };

        write_to_file(&edges, &path, XML_HEADER).unwrap();
        let read: IOEdges = read_from_file(&path).unwrap();

        assert_eq!(edges, read);
    }
}
