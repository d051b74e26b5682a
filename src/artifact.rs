// Contract artifact handling
//
// Creation bytecode is produced by external compiler tooling and arrives as
// hex, either in a file or inline on the command line.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ethers::types::Bytes;

/// A compiled contract ready for deployment
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Contract name, used in logs and reports
    pub name: String,

    /// Creation bytecode, constructor included
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Build an artifact from a hex string, 0x prefix optional
    pub fn from_hex_str(name: &str, hex_str: &str) -> Result<Self> {
        let trimmed = hex_str.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(anyhow!("empty bytecode for contract {}", name));
        }
        let bytecode = hex::decode(stripped)
            .with_context(|| format!("invalid bytecode hex for contract {}", name))?;
        Ok(Self {
            name: name.to_string(),
            bytecode: Bytes::from(bytecode),
        })
    }

    /// Read an artifact from a hex file written by the compiler tooling
    pub fn from_hex_file<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read bytecode file {:?}", path.as_ref()))?;
        Self::from_hex_str(name, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_hex_with_and_without_prefix() -> Result<()> {
        let plain = ContractArtifact::from_hex_str("Crowdsale", "6080604052")?;
        let prefixed = ContractArtifact::from_hex_str("Crowdsale", "0x6080604052")?;

        assert_eq!(plain.bytecode, prefixed.bytecode);
        assert_eq!(plain.bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);
        Ok(())
    }

    #[test]
    fn rejects_invalid_and_empty_input() {
        assert!(ContractArtifact::from_hex_str("Crowdsale", "0xzz").is_err());
        assert!(ContractArtifact::from_hex_str("Crowdsale", "").is_err());
        assert!(ContractArtifact::from_hex_str("Crowdsale", "0x").is_err());
    }

    #[test]
    fn reads_bytecode_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "0x6080604052")?;

        let artifact = ContractArtifact::from_hex_file("Crowdsale", file.path())?;
        assert_eq!(artifact.name, "Crowdsale");
        assert_eq!(artifact.bytecode.len(), 5);
        Ok(())
    }
}
