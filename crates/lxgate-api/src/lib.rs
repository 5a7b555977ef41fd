// lxgate-api: Async Rust client for the LX sensor gateway (REST + alert stream)

pub mod error;
pub mod gateway;
pub mod transport;
pub mod types;
pub mod websocket;

pub use error::Error;
pub use gateway::GatewayClient;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    AttackTypeInfo, FeatureContribution, LoginResponse, RawAlert, SensorCatalog, SensorReading,
    ShapExplanation, SimulationTarget, UserAccount,
};
pub use websocket::{AlertStreamHandle, ReconnectConfig, StreamStatus};
