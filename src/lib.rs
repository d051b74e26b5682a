pub mod artifact;
pub mod config;
pub mod ethereum;
pub mod migration;

pub use artifact::ContractArtifact;
pub use common::{DeploymentParameters, ParameterError, Rate};
pub use config::{ConfigManager, DeployConfig, NetworkConfig};
pub use ethereum::{BlockingDeployer, DeployOutcome, EthereumConnector};
pub use migration::{compute_parameters, run, Deployer};
