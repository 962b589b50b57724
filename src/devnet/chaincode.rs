//! Car lifecycle contract executed by the devnet.
//!
//! Execution is split the way a peer splits it: `simulate` runs the function
//! against a read-only view and yields a payload plus a write set; only a
//! committed submit applies the write set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status set by `UpdateDealer`.
pub const READY_FOR_SALE: &str = "READY_FOR_SALE";
/// Status set by `SellCar`.
pub const SOLD: &str = "SOLD";

/// A car as stored in world state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Car {
    #[serde(rename = "carId")]
    pub car_id: String,
    #[serde(rename = "cartype")]
    pub car_type: String,
    pub make: String,
    pub model: String,
    pub colour: String,
    pub dealer: String,
    pub owner: String,
    pub status: String,
}

/// One committed modification of a key.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub tx_id: String,
    pub value: Option<Vec<u8>>,
    pub timestamp: DateTime<Utc>,
    pub is_delete: bool,
}

/// Key/value world state with per-key history.
#[derive(Debug, Default)]
pub struct WorldState {
    values: HashMap<String, Vec<u8>>,
    history: HashMap<String, Vec<HistoryRecord>>,
}

impl WorldState {
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn history(&self, key: &str) -> &[HistoryRecord] {
        self.history.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Apply a committed write set.
    pub fn apply(&mut self, tx_id: &str, timestamp: DateTime<Utc>, writes: Vec<(String, Vec<u8>)>) {
        for (key, value) in writes {
            self.history.entry(key.clone()).or_default().push(HistoryRecord {
                tx_id: tx_id.to_string(),
                value: Some(value.clone()),
                timestamp,
                is_delete: false,
            });
            self.values.insert(key, value);
        }
    }
}

/// Caller context for one transaction.
#[derive(Debug, Clone)]
pub struct TxContext {
    pub tx_id: String,
    pub msp_id: String,
}

/// Result of simulating a function.
#[derive(Debug, Default)]
pub struct Simulation {
    pub payload: Vec<u8>,
    pub writes: Vec<(String, Vec<u8>)>,
}

impl Simulation {
    fn read(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            writes: Vec::new(),
        }
    }

    fn write(ctx: &TxContext, key: String, car: &Car) -> Result<Self, String> {
        let bytes = serde_json::to_vec(car).map_err(|e| format!("failed marshal {}", e))?;
        Ok(Self {
            payload: ctx.tx_id.clone().into_bytes(),
            writes: vec![(key, bytes)],
        })
    }
}

/// Run `function` against `state` without modifying it.
pub fn simulate(state: &WorldState, ctx: &TxContext, function: &str, args: &[String]) -> Result<Simulation, String> {
    let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or_default();

    match function {
        "ManufactureCar" => manufacture_car(state, ctx, arg(0)),
        "UpdateDealer" => update_dealer(state, ctx, arg(0), arg(1)),
        "SellCar" => sell_car(state, ctx, arg(0), arg(1)),
        "ChangeCarOwner" => change_car_owner(state, ctx, arg(0), arg(1), arg(2)),
        "CarExists" => Ok(Simulation::read(car_exists(state, arg(0)).to_string())),
        "QueryCar" => {
            let car = query_car(state, arg(0))?;
            let json = serde_json::to_vec(&car).map_err(|e| e.to_string())?;
            Ok(Simulation::read(json))
        }
        "GetHistoryForCar" => Ok(Simulation::read(history_for_car(state, arg(0)))),
        other => Err(format!(
            "Function {} not found in contract SmartContract",
            other
        )),
    }
}

fn require_msp(ctx: &TxContext, msp_id: &str, action: &str) -> Result<(), String> {
    if ctx.msp_id != msp_id {
        return Err(format!("client is not authorized to {}", action));
    }
    Ok(())
}

fn load_car(state: &WorldState, car_id: &str) -> Result<Car, String> {
    let bytes = state
        .get(car_id)
        .ok_or_else(|| format!("the car {} does not exist", car_id))?;
    Ok(serde_json::from_slice(bytes).unwrap_or_default())
}

fn manufacture_car(state: &WorldState, ctx: &TxContext, car_data: &str) -> Result<Simulation, String> {
    require_msp(ctx, "Org1MSP", "manufacture new car")?;
    if car_data.is_empty() {
        return Err("please pass the correct Car data".to_string());
    }

    let car: Car = serde_json::from_str(car_data)
        .map_err(|e| format!("failed while unmarshling car data {}", e))?;
    if car_exists(state, &car.car_id) {
        return Err(format!("Car with CarId {} already exists", car.car_id));
    }
    Simulation::write(ctx, car.car_id.clone(), &car)
}

fn update_dealer(state: &WorldState, ctx: &TxContext, car_id: &str, dealer: &str) -> Result<Simulation, String> {
    require_msp(ctx, "Org1MSP", "update dealer information")?;
    if car_id.is_empty() {
        return Err("please pass the correct Car ID".to_string());
    }

    let mut car = load_car(state, car_id)?;
    car.dealer = dealer.to_string();
    car.status = READY_FOR_SALE.to_string();
    Simulation::write(ctx, car.car_id.clone(), &car)
}

fn sell_car(state: &WorldState, ctx: &TxContext, car_id: &str, owner: &str) -> Result<Simulation, String> {
    require_msp(ctx, "Org2MSP", "sell car")?;
    if car_id.is_empty() {
        return Err("please pass the correct Car ID".to_string());
    }

    let mut car = load_car(state, car_id)?;
    if car.status == SOLD {
        return Err("car already sold. Please try purchasing other car".to_string());
    }
    if car.status != READY_FOR_SALE {
        return Err("Car is not on sale, please contact dealer".to_string());
    }

    car.owner = owner.to_string();
    car.status = SOLD.to_string();
    Simulation::write(ctx, car.car_id.clone(), &car)
}

fn change_car_owner(
    state: &WorldState,
    ctx: &TxContext,
    car_id: &str,
    current_owner: &str,
    new_owner: &str,
) -> Result<Simulation, String> {
    let mut car = query_car(state, car_id).map_err(|e| format!("error while querying car: {}", e))?;
    if car.owner != current_owner {
        return Err("current owner does not match".to_string());
    }

    car.owner = new_owner.to_string();
    Simulation::write(ctx, car_id.to_string(), &car)
}

fn car_exists(state: &WorldState, car_id: &str) -> bool {
    state.get(car_id).is_some()
}

fn query_car(state: &WorldState, car_id: &str) -> Result<Car, String> {
    let bytes = state
        .get(car_id)
        .ok_or_else(|| format!("{} does not exist", car_id))?;
    Ok(serde_json::from_slice(bytes).unwrap_or_default())
}

fn history_for_car(state: &WorldState, car_id: &str) -> String {
    let entries: Vec<serde_json::Value> = state
        .history(car_id)
        .iter()
        .map(|record| {
            let value = match &record.value {
                Some(bytes) if !record.is_delete => {
                    serde_json::from_slice(bytes).unwrap_or(serde_json::Value::Null)
                }
                _ => serde_json::Value::Null,
            };
            serde_json::json!({
                "TxId": record.tx_id,
                "Value": value,
                "Timestamp": record.timestamp.to_rfc3339(),
                "IsDelete": record.is_delete.to_string(),
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}
