use async_trait::async_trait;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use tracing::debug;

use crate::billing::VolumeRecord;
use crate::error::AppError;

/// Supplier of the raw volume inventory of a region
#[async_trait]
pub trait VolumeSource: Send + Sync {
    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, AppError>;
}

/// `DescribeVolumes` output as printed by `aws ec2 describe-volumes`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeVolumesOutput {
    #[serde(default)]
    pub volumes: Vec<Ec2Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ec2Volume {
    pub volume_id: String,
    pub volume_type: String,
    pub size: u64,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub availability_zone: Option<String>,
}

impl From<Ec2Volume> for VolumeRecord {
    fn from(volume: Ec2Volume) -> Self {
        VolumeRecord {
            id: volume.volume_id,
            tier: volume.volume_type,
            size_units: volume.size,
            attachment_count: volume.attachments.len() as u32,
            availability_zone: volume.availability_zone,
        }
    }
}

/// Where the `DescribeVolumes` document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryInput {
    Stdin,
    File(PathBuf),
}

impl InventoryInput {
    /// `-` selects stdin, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InventoryInput::Stdin
        } else {
            InventoryInput::File(PathBuf::from(arg))
        }
    }
}

/// Volume source backed by a `DescribeVolumes` JSON document
pub struct DescribeVolumesFile {
    input: InventoryInput,
}

impl DescribeVolumesFile {
    pub fn new(input: InventoryInput) -> Self {
        Self { input }
    }

    /// Parse an already opened document
    pub fn parse<R: Read>(reader: R) -> Result<Vec<VolumeRecord>, AppError> {
        let output: DescribeVolumesOutput = serde_json::from_reader(reader)
            .map_err(|e| AppError::Inventory(format!("invalid DescribeVolumes document: {}", e)))?;
        Ok(output.volumes.into_iter().map(VolumeRecord::from).collect())
    }
}

#[async_trait]
impl VolumeSource for DescribeVolumesFile {
    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, AppError> {
        let records = match &self.input {
            InventoryInput::Stdin => {
                let stdin = io::stdin();
                Self::parse(stdin.lock())?
            }
            InventoryInput::File(path) => {
                let file = File::open(path).map_err(|e| {
                    AppError::Inventory(format!("cannot open {}: {}", path.display(), e))
                })?;
                Self::parse(BufReader::new(file))?
            }
        };
        debug!(volumes = records.len(), input = ?self.input, "loaded volume inventory");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "Volumes": [
            {
                "AvailabilityZone": "eu-west-1a",
                "Attachments": [
                    {
                        "AttachTime": "2023-01-10T09:12:00.000Z",
                        "InstanceId": "i-0abc",
                        "VolumeId": "vol-0001",
                        "State": "attached",
                        "DeleteOnTermination": true,
                        "Device": "/dev/xvda"
                    }
                ],
                "Encrypted": false,
                "VolumeType": "gp2",
                "VolumeId": "vol-0001",
                "State": "in-use",
                "Iops": 100,
                "Size": 8
            },
            {
                "AvailabilityZone": "eu-west-1b",
                "Attachments": [],
                "VolumeType": "sc1",
                "VolumeId": "vol-0002",
                "State": "available",
                "Size": 500
            }
        ]
    }"#;

    #[test]
    fn test_parse_describe_volumes() {
        let records = DescribeVolumesFile::parse(DOCUMENT.as_bytes()).unwrap();

        assert_eq!(
            records,
            vec![
                VolumeRecord::new("vol-0001", "gp2", 8, 1).in_zone("eu-west-1a"),
                VolumeRecord::new("vol-0002", "sc1", 500, 0).in_zone("eu-west-1b"),
            ]
        );
    }

    #[test]
    fn test_unknown_volume_type_is_kept_raw() {
        let doc = r#"{"Volumes":[{"VolumeId":"vol-9","VolumeType":"io2","Size":4}]}"#;
        let records = DescribeVolumesFile::parse(doc.as_bytes()).unwrap();
        assert_eq!(records[0].tier, "io2");
        assert_eq!(records[0].attachment_count, 0);
        assert_eq!(records[0].availability_zone, None);
    }

    #[test]
    fn test_empty_document() {
        let records = DescribeVolumesFile::parse("{}".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_document() {
        let result = DescribeVolumesFile::parse("[1, 2".as_bytes());
        assert!(matches!(result, Err(AppError::Inventory(_))));
    }

    #[tokio::test]
    async fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let source = DescribeVolumesFile::new(InventoryInput::File(file.path().to_path_buf()));
        assert_eq!(source.list_volumes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = DescribeVolumesFile::new(InventoryInput::from_arg("/nonexistent/volumes.json"));
        assert!(matches!(source.list_volumes().await, Err(AppError::Inventory(_))));
    }

    #[test]
    fn test_dash_means_stdin() {
        assert_eq!(InventoryInput::from_arg("-"), InventoryInput::Stdin);
    }
}
