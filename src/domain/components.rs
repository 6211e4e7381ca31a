// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connectable Components
//!
//! Cable terminations are polymorphic. Rather than inspecting types at
//! runtime, every endpoint is addressed by a [`TerminationRef`]: an explicit
//! [`TerminationKind`] tag plus the component's id. The component data itself
//! lives in the closed [`Component`] enum.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CircuitId, ComponentId, DeviceId, LocationId, PowerPanelId, ProviderNetworkId, RackId};

/// Kind tag of a cable termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationKind {
    CircuitTermination,
    ConsolePort,
    ConsoleServerPort,
    FrontPort,
    Interface,
    PowerFeed,
    PowerOutlet,
    PowerPort,
    RearPort,
}

impl TerminationKind {
    /// Kinds this kind may be cabled to
    pub fn compatible_kinds(&self) -> &'static [TerminationKind] {
        use TerminationKind::*;
        match self {
            CircuitTermination => &[Interface, FrontPort, RearPort, CircuitTermination],
            ConsolePort => &[ConsoleServerPort, FrontPort, RearPort],
            ConsoleServerPort => &[ConsolePort, FrontPort, RearPort],
            Interface => &[Interface, CircuitTermination, FrontPort, RearPort],
            FrontPort | RearPort => &[
                ConsolePort,
                ConsoleServerPort,
                Interface,
                FrontPort,
                RearPort,
                CircuitTermination,
            ],
            PowerFeed => &[PowerPort],
            PowerOutlet => &[PowerPort],
            PowerPort => &[PowerOutlet, PowerFeed],
        }
    }

    pub fn is_compatible_with(&self, other: TerminationKind) -> bool {
        self.compatible_kinds().contains(&other)
    }

    /// Front and rear ports pass signals through rather than ending them
    pub fn is_pass_through(&self) -> bool {
        matches!(self, TerminationKind::FrontPort | TerminationKind::RearPort)
    }

    pub fn verbose_name(&self) -> &'static str {
        match self {
            TerminationKind::CircuitTermination => "circuit termination",
            TerminationKind::ConsolePort => "console port",
            TerminationKind::ConsoleServerPort => "console server port",
            TerminationKind::FrontPort => "front port",
            TerminationKind::Interface => "interface",
            TerminationKind::PowerFeed => "power feed",
            TerminationKind::PowerOutlet => "power outlet",
            TerminationKind::PowerPort => "power port",
            TerminationKind::RearPort => "rear port",
        }
    }
}

impl fmt::Display for TerminationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verbose_name())
    }
}

/// Typed reference to a cable endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerminationRef {
    pub kind: TerminationKind,
    pub id: ComponentId,
}

impl TerminationRef {
    pub fn new(kind: TerminationKind, id: ComponentId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for TerminationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Physical or logical interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceType {
    Virtual,
    Bridge,
    Lag,
    #[serde(rename = "100base-tx")]
    Base100Tx,
    #[default]
    #[serde(rename = "1000base-t")]
    Base1000T,
    #[serde(rename = "10gbase-x-sfpp")]
    Base10GSfpPlus,
    #[serde(rename = "25gbase-x-sfp28")]
    Base25GSfp28,
    #[serde(rename = "40gbase-x-qsfpp")]
    Base40GQsfpPlus,
    #[serde(rename = "100gbase-x-qsfp28")]
    Base100GQsfp28,
    #[serde(rename = "ieee802.11a")]
    Ieee80211a,
    #[serde(rename = "ieee802.11g")]
    Ieee80211g,
    #[serde(rename = "ieee802.11n")]
    Ieee80211n,
    #[serde(rename = "ieee802.11ac")]
    Ieee80211ac,
    #[serde(rename = "ieee802.11ad")]
    Ieee80211ad,
    #[serde(rename = "ieee802.11ax")]
    Ieee80211ax,
    Lte,
    Other,
}

impl InterfaceType {
    pub fn is_virtual(&self) -> bool {
        matches!(self, InterfaceType::Virtual | InterfaceType::Bridge | InterfaceType::Lag)
    }

    pub fn is_wireless(&self) -> bool {
        matches!(
            self,
            InterfaceType::Ieee80211a
                | InterfaceType::Ieee80211g
                | InterfaceType::Ieee80211n
                | InterfaceType::Ieee80211ac
                | InterfaceType::Ieee80211ad
                | InterfaceType::Ieee80211ax
                | InterfaceType::Lte
        )
    }

    /// Virtual and wireless interfaces never take a cable
    pub fn is_connectable(&self) -> bool {
        !self.is_virtual() && !self.is_wireless()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InterfaceType::Virtual => "Virtual",
            InterfaceType::Bridge => "Bridge",
            InterfaceType::Lag => "Link Aggregation Group (LAG)",
            InterfaceType::Base100Tx => "100BASE-TX (10/100ME)",
            InterfaceType::Base1000T => "1000BASE-T (1GE)",
            InterfaceType::Base10GSfpPlus => "SFP+ (10GE)",
            InterfaceType::Base25GSfp28 => "SFP28 (25GE)",
            InterfaceType::Base40GQsfpPlus => "QSFP+ (40GE)",
            InterfaceType::Base100GQsfp28 => "QSFP28 (100GE)",
            InterfaceType::Ieee80211a => "IEEE 802.11a",
            InterfaceType::Ieee80211g => "IEEE 802.11b/g",
            InterfaceType::Ieee80211n => "IEEE 802.11n",
            InterfaceType::Ieee80211ac => "IEEE 802.11ac",
            InterfaceType::Ieee80211ad => "IEEE 802.11ad",
            InterfaceType::Ieee80211ax => "IEEE 802.11ax",
            InterfaceType::Lte => "LTE",
            InterfaceType::Other => "Other",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Side of a circuit a termination sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermSide {
    A,
    Z,
}

impl fmt::Display for TermSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSide::A => write!(f, "A"),
            TermSide::Z => write!(f, "Z"),
        }
    }
}

/// Console, console-server, power port or power outlet on a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePort {
    pub id: ComponentId,
    pub device: DeviceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: ComponentId,
    pub device: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
}

/// Pass-through port backed by one position of a rear port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontPort {
    pub id: ComponentId,
    pub device: DeviceId,
    pub name: String,
    pub rear_port: ComponentId,
    pub rear_port_position: u16,
}

/// Pass-through port multiplexing one or more front ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RearPort {
    pub id: ComponentId,
    pub device: DeviceId,
    pub name: String,
    pub positions: u16,
}

/// Circuit end, attached either to a location or to a provider network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitTermination {
    pub id: ComponentId,
    pub circuit: CircuitId,
    pub term_side: TermSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_network: Option<ProviderNetworkId>,
}

/// Feed drawn from a power panel, optionally delivered to a rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerFeed {
    pub id: ComponentId,
    pub name: String,
    pub power_panel: PowerPanelId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<RackId>,
}

/// Any cable-connectable component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Component {
    CircuitTermination(CircuitTermination),
    ConsolePort(DevicePort),
    ConsoleServerPort(DevicePort),
    FrontPort(FrontPort),
    Interface(Interface),
    PowerFeed(PowerFeed),
    PowerOutlet(DevicePort),
    PowerPort(DevicePort),
    RearPort(RearPort),
}

impl Component {
    pub fn interface(device: DeviceId, name: impl Into<String>, interface_type: InterfaceType) -> Self {
        Component::Interface(Interface {
            id: ComponentId::new(),
            device,
            name: name.into(),
            interface_type,
        })
    }

    pub fn console_port(device: DeviceId, name: impl Into<String>) -> Self {
        Component::ConsolePort(DevicePort::new(device, name))
    }

    pub fn console_server_port(device: DeviceId, name: impl Into<String>) -> Self {
        Component::ConsoleServerPort(DevicePort::new(device, name))
    }

    pub fn power_port(device: DeviceId, name: impl Into<String>) -> Self {
        Component::PowerPort(DevicePort::new(device, name))
    }

    pub fn power_outlet(device: DeviceId, name: impl Into<String>) -> Self {
        Component::PowerOutlet(DevicePort::new(device, name))
    }

    pub fn rear_port(device: DeviceId, name: impl Into<String>, positions: u16) -> Self {
        Component::RearPort(RearPort {
            id: ComponentId::new(),
            device,
            name: name.into(),
            positions,
        })
    }

    pub fn front_port(
        device: DeviceId,
        name: impl Into<String>,
        rear_port: ComponentId,
        rear_port_position: u16,
    ) -> Self {
        Component::FrontPort(FrontPort {
            id: ComponentId::new(),
            device,
            name: name.into(),
            rear_port,
            rear_port_position,
        })
    }

    pub fn circuit_termination_at(circuit: CircuitId, term_side: TermSide, location: LocationId) -> Self {
        Component::CircuitTermination(CircuitTermination {
            id: ComponentId::new(),
            circuit,
            term_side,
            location: Some(location),
            provider_network: None,
        })
    }

    pub fn circuit_termination_to_provider(
        circuit: CircuitId,
        term_side: TermSide,
        provider_network: ProviderNetworkId,
    ) -> Self {
        Component::CircuitTermination(CircuitTermination {
            id: ComponentId::new(),
            circuit,
            term_side,
            location: None,
            provider_network: Some(provider_network),
        })
    }

    pub fn power_feed(name: impl Into<String>, power_panel: PowerPanelId, rack: Option<RackId>) -> Self {
        Component::PowerFeed(PowerFeed {
            id: ComponentId::new(),
            name: name.into(),
            power_panel,
            rack,
        })
    }

    pub fn id(&self) -> ComponentId {
        match self {
            Component::CircuitTermination(c) => c.id,
            Component::ConsolePort(p)
            | Component::ConsoleServerPort(p)
            | Component::PowerOutlet(p)
            | Component::PowerPort(p) => p.id,
            Component::FrontPort(p) => p.id,
            Component::Interface(i) => i.id,
            Component::PowerFeed(f) => f.id,
            Component::RearPort(p) => p.id,
        }
    }

    pub fn kind(&self) -> TerminationKind {
        match self {
            Component::CircuitTermination(_) => TerminationKind::CircuitTermination,
            Component::ConsolePort(_) => TerminationKind::ConsolePort,
            Component::ConsoleServerPort(_) => TerminationKind::ConsoleServerPort,
            Component::FrontPort(_) => TerminationKind::FrontPort,
            Component::Interface(_) => TerminationKind::Interface,
            Component::PowerFeed(_) => TerminationKind::PowerFeed,
            Component::PowerOutlet(_) => TerminationKind::PowerOutlet,
            Component::PowerPort(_) => TerminationKind::PowerPort,
            Component::RearPort(_) => TerminationKind::RearPort,
        }
    }

    pub fn termination(&self) -> TerminationRef {
        TerminationRef::new(self.kind(), self.id())
    }

    /// Parent device, for device components
    pub fn device(&self) -> Option<DeviceId> {
        match self {
            Component::ConsolePort(p)
            | Component::ConsoleServerPort(p)
            | Component::PowerOutlet(p)
            | Component::PowerPort(p) => Some(p.device),
            Component::FrontPort(p) => Some(p.device),
            Component::Interface(i) => Some(i.device),
            Component::RearPort(p) => Some(p.device),
            Component::CircuitTermination(_) | Component::PowerFeed(_) => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Component::CircuitTermination(c) => format!("Termination {}", c.term_side),
            Component::ConsolePort(p)
            | Component::ConsoleServerPort(p)
            | Component::PowerOutlet(p)
            | Component::PowerPort(p) => p.name.clone(),
            Component::FrontPort(p) => p.name.clone(),
            Component::Interface(i) => i.name.clone(),
            Component::PowerFeed(f) => f.name.clone(),
            Component::RearPort(p) => p.name.clone(),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl DevicePort {
    pub fn new(device: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id: ComponentId::new(),
            device,
            name: name.into(),
        }
    }
}
