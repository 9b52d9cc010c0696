//! Cart aggregation
//!
//! Selections merge on `(menu_item_id, normalized observation, sorted side ids)`.
//! The cart is never sent as-is: [`explode`] turns every line into one primary
//! billable line plus one zero-priced line per side dish.

use crate::error::{FloorError, FloorResult};
use serde::{Deserialize, Serialize};
use shared::models::BillableLine;
use shared::money;
use shared::serde_helpers::normalize_observation;

/// A dish as picked from the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDish {
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
}

impl MenuDish {
    pub fn new(menu_item_id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Side dish attached to a cart line (配菜, always billed at 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDish {
    pub menu_item_id: String,
    pub name: String,
}

impl SideDish {
    pub fn new(menu_item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
        }
    }
}

/// Pre-order line, local to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Local handle for quantity edits; never sent to the backend
    pub line_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    /// Normalized, never empty
    pub observation: String,
    /// Sorted by `menu_item_id`
    pub sides: Vec<SideDish>,
}

impl CartLine {
    fn has_key(&self, menu_item_id: &str, observation: &str, sides: &[SideDish]) -> bool {
        self.menu_item_id == menu_item_id
            && self.observation == observation
            && self.sides.len() == sides.len()
            && self
                .sides
                .iter()
                .zip(sides)
                .all(|(a, b)| a.menu_item_id == b.menu_item_id)
    }

    pub fn subtotal(&self) -> f64 {
        money::to_f64(money::line_total(self.price, self.quantity))
    }
}

/// Observation carried by a side-dish billable line
pub fn side_observation(parent_name: &str) -> String {
    format!("side dish for {}", parent_name)
}

fn canonical_sides(sides: &[SideDish]) -> Vec<SideDish> {
    let mut sorted = sides.to_vec();
    sorted.sort_by(|a, b| a.menu_item_id.cmp(&b.menu_item_id));
    sorted
}

/// Session cart (购物车)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a selection, merging into an existing line with the same key
    pub fn add(
        &mut self,
        dish: &MenuDish,
        quantity: i32,
        observation: &str,
        sides: &[SideDish],
    ) -> FloorResult<&[CartLine]> {
        if quantity <= 0 {
            return Err(FloorError::Validation(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }
        if dish.menu_item_id.trim().is_empty() {
            return Err(FloorError::Validation("menu_item_id is required".to_string()));
        }
        if !dish.price.is_finite() || dish.price < 0.0 || dish.price > money::MAX_PRICE {
            return Err(FloorError::Validation(format!(
                "invalid price {} for {}",
                dish.price, dish.menu_item_id
            )));
        }

        if quantity > money::MAX_QUANTITY {
            return Err(FloorError::Validation(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                money::MAX_QUANTITY,
                quantity
            )));
        }

        let observation = normalize_observation(observation);
        let sides = canonical_sides(sides);

        match self
            .lines
            .iter_mut()
            .find(|line| line.has_key(&dish.menu_item_id, &observation, &sides))
        {
            Some(line) => {
                let merged = line.quantity.saturating_add(quantity);
                if merged > money::MAX_QUANTITY {
                    return Err(FloorError::Validation(format!(
                        "quantity exceeds maximum allowed ({}), got {}",
                        money::MAX_QUANTITY,
                        merged
                    )));
                }
                line.quantity = merged;
                tracing::debug!(line_id = %line.line_id, quantity = line.quantity, "cart line merged");
            }
            None => {
                let line = CartLine {
                    line_id: uuid::Uuid::new_v4().to_string(),
                    menu_item_id: dish.menu_item_id.clone(),
                    name: dish.name.clone(),
                    price: dish.price,
                    quantity,
                    observation,
                    sides,
                };
                tracing::debug!(line_id = %line.line_id, menu_item_id = %line.menu_item_id, "cart line added");
                self.lines.push(line);
            }
        }
        Ok(self.lines.as_slice())
    }

    /// Replace a line's quantity; zero or less deletes the line
    pub fn update_quantity(&mut self, line_id: &str, quantity: i32) -> FloorResult<()> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.line_id == line_id)
            .ok_or_else(|| FloorError::NotFound(format!("cart line {}", line_id)))?;

        if quantity <= 0 {
            self.lines.remove(idx);
        } else if quantity > money::MAX_QUANTITY {
            return Err(FloorError::Validation(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                money::MAX_QUANTITY,
                quantity
            )));
        } else {
            self.lines[idx].quantity = quantity;
        }
        Ok(())
    }

    pub fn remove(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.line_id != line_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> f64 {
        total(&self.lines)
    }

    pub fn explode(&self) -> Vec<BillableLine> {
        explode(&self.lines)
    }
}

/// Expand cart lines into billable lines
pub fn explode(lines: &[CartLine]) -> Vec<BillableLine> {
    let mut billable = Vec::with_capacity(lines.iter().map(|l| 1 + l.sides.len()).sum());
    for line in lines {
        billable.push(BillableLine {
            menu_item_id: line.menu_item_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            observation: line.observation.clone(),
            price: line.price,
        });
        billable.extend(line.sides.iter().map(|side| BillableLine {
            menu_item_id: side.menu_item_id.clone(),
            name: side.name.clone(),
            quantity: line.quantity,
            observation: side_observation(&line.name),
            price: 0.0,
        }));
    }
    billable
}

/// Cart total over primary lines only
pub fn total(lines: &[CartLine]) -> f64 {
    money::sum_lines(lines.iter().map(|l| (l.price, l.quantity)))
}
