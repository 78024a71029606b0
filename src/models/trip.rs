use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fleet vehicle codes a trip can be logged against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum VehicleType {
    #[default]
    #[serde(rename = "van-passageiro-tipo01")]
    PassengerVanType01,
    #[serde(rename = "servico-tipo01")]
    ServiceType01,
    #[serde(rename = "picape-tipo01")]
    PickupType01,
    #[serde(rename = "van-carga-tipo01")]
    CargoVanType01,
    #[serde(rename = "van-passageiro-tipo02")]
    PassengerVanType02,
    #[serde(rename = "picape-tipo02")]
    PickupType02,
    #[serde(rename = "motocicleta-tipo02")]
    MotorcycleType02,
    #[serde(rename = "furgao-carga-tipo01")]
    PanelVanType01,
    #[serde(rename = "caminhao-bau-34")]
    BoxTruck34,
    #[serde(rename = "servico-tipo02")]
    ServiceType02,
    #[serde(rename = "pesado")]
    Heavy,
}

/// Broad grouping of the fleet codes, used for badges in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleCategory {
    Car,
    Van,
    Truck,
    Motorcycle,
}

impl VehicleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::Car => "car",
            VehicleCategory::Van => "van",
            VehicleCategory::Truck => "truck",
            VehicleCategory::Motorcycle => "motorcycle",
        }
    }
}

impl VehicleType {
    pub const ALL: [VehicleType; 11] = [
        VehicleType::PassengerVanType01,
        VehicleType::ServiceType01,
        VehicleType::PickupType01,
        VehicleType::CargoVanType01,
        VehicleType::PassengerVanType02,
        VehicleType::PickupType02,
        VehicleType::MotorcycleType02,
        VehicleType::PanelVanType01,
        VehicleType::BoxTruck34,
        VehicleType::ServiceType02,
        VehicleType::Heavy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::PassengerVanType01 => "van-passageiro-tipo01",
            VehicleType::ServiceType01 => "servico-tipo01",
            VehicleType::PickupType01 => "picape-tipo01",
            VehicleType::CargoVanType01 => "van-carga-tipo01",
            VehicleType::PassengerVanType02 => "van-passageiro-tipo02",
            VehicleType::PickupType02 => "picape-tipo02",
            VehicleType::MotorcycleType02 => "motocicleta-tipo02",
            VehicleType::PanelVanType01 => "furgao-carga-tipo01",
            VehicleType::BoxTruck34 => "caminhao-bau-34",
            VehicleType::ServiceType02 => "servico-tipo02",
            VehicleType::Heavy => "pesado",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::PassengerVanType01 => "VAN PASSAGEIRO (TIPO 01)",
            VehicleType::ServiceType01 => "SERVIÇO (TIPO 01)",
            VehicleType::PickupType01 => "PICAPE (TIPO 01)",
            VehicleType::CargoVanType01 => "VAN DE CARGA (TIPO 01)",
            VehicleType::PassengerVanType02 => "VAN PASSAGEIRO (TIPO 02)",
            VehicleType::PickupType02 => "PICAPE (TIPO 02)",
            VehicleType::MotorcycleType02 => "MOTOCICLETA (TIPO 02)",
            VehicleType::PanelVanType01 => "FURGÃO DE CARGA (TIPO 01)",
            VehicleType::BoxTruck34 => "CAMINHÃO BAÚ 3/4",
            VehicleType::ServiceType02 => "SERVIÇO (TIPO 02)",
            VehicleType::Heavy => "PESADO",
        }
    }

    pub fn category(&self) -> VehicleCategory {
        match self {
            VehicleType::MotorcycleType02 => VehicleCategory::Motorcycle,
            VehicleType::BoxTruck34 | VehicleType::Heavy => VehicleCategory::Truck,
            VehicleType::PassengerVanType01
            | VehicleType::PassengerVanType02
            | VehicleType::CargoVanType01
            | VehicleType::PanelVanType01 => VehicleCategory::Van,
            VehicleType::ServiceType01
            | VehicleType::ServiceType02
            | VehicleType::PickupType01
            | VehicleType::PickupType02 => VehicleCategory::Car,
        }
    }
}

/// Intermediate waypoint of a trip. Owned by its trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub destination: String,
    pub departure_location: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub kilometers_at_arrival: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

/// One logged vehicle journey.
///
/// `arrival_time`, `final_kilometers` and `driver_name` are optional so that
/// collections written by the shorter form layout still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub vehicle_type: VehicleType,
    pub vehicle_plate: String,
    pub date: NaiveDate,
    pub start_location: String,
    pub departure_time: String,
    pub initial_kilometers: i64,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_kilometers: Option<i64>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default)]
    pub is_substitution: bool,
}

impl Trip {
    pub fn driver_text(&self) -> &str {
        self.driver_name.as_deref().unwrap_or("")
    }

    pub fn arrival_text(&self) -> &str {
        self.arrival_time.as_deref().unwrap_or("")
    }

    pub fn activity_text(&self) -> &str {
        self.activity.as_deref().unwrap_or("")
    }
}
