// ad2kp-api: wire protocol, device-state model and line transports for the AD2 virtual keypad.

pub mod error;
pub mod model;
pub mod protocol;
pub mod transport;

pub use error::{Error, ProtocolError};
pub use model::DeviceState;
pub use protocol::{ControlLine, ControlVerb, Message, PING_MASK, parse_line};
pub use transport::{Connector, LineTransport, TcpConnector, WebSocketConnector};
