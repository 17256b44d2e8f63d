//! # Bill Calculation Engine
//!
//! The heart of Patungan: a pure function turning a [`Bill`] into a
//! per-participant breakdown.
//!
//! ## The Three Passes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     calculate(bill)                                     │
//! │                                                                         │
//! │  Pass 1: Items                                                          │
//! │    each assigned item ──► line total / assignee count ──► per-person   │
//! │    subtotals + named item shares (unassigned items contribute nothing) │
//! │                                                                         │
//! │  Pass 2: Extras (in bill order)                                         │
//! │    resolve amount (% of subtotal or fixed, discounts negated)          │
//! │    ──► accumulate extras_total                                         │
//! │    ──► distribute: Equally | Proportionally | Host                     │
//! │                                                                         │
//! │  Pass 3: Finalize                                                       │
//! │    per-person total = subtotal + extras                                │
//! │    grand_total      = bill_subtotal + extras_total                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Floating Point, Deliberately
//! Amounts are `f64` currency units and nothing rounds until display. A
//! three-way split of 100 000 really is 33 333.333... per person; the
//! presentation layer decides how to show it. This also means `grand_total`
//! can legitimately differ from the sum of participant totals; see
//! [`BillCalculation`].
//!
//! ## Determinism
//! Same bill in, bit-identical breakdown out. All accumulation walks the
//! bill's own ordered lists (participants, items, extras); map iteration
//! order never feeds a float sum.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Bill, ExtraSplitMode};

// =============================================================================
// Result Types
// =============================================================================

/// One participant's share of a single item, for the per-person breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemShare {
    /// Item name as it appears on the bill.
    pub name: String,

    /// This participant's slice of the item's line total.
    pub share: f64,
}

/// Accumulated amounts for one participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ParticipantTotal {
    /// Sum of this participant's item shares.
    pub subtotal: f64,

    /// Signed sum of this participant's extra shares (discounts negative).
    pub extras: f64,

    /// `subtotal + extras`.
    pub total: f64,

    /// Item shares in bill item order.
    pub items: Vec<ItemShare>,
}

/// The derived breakdown of a bill.
///
/// A `BillCalculation` is a view: recomputed from the bill on every call,
/// never stored, no identity of its own.
///
/// ## Known divergence
/// `grand_total` is `subtotal + extras_total`, which is NOT always the sum
/// of `participant_totals[*].total`: an unassigned item inflates neither,
/// but a percentage extra still resolves against the assigned subtotal; and
/// a `Proportionally` extra over a zero subtotal lands in `extras_total`
/// while distributing to no one. Observed product behavior, preserved
/// as-is; do not reconcile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillCalculation {
    /// Sum of assigned items' line totals.
    pub subtotal: f64,

    /// Signed sum of all resolved extras.
    pub extras_total: f64,

    /// `subtotal + extras_total`.
    pub grand_total: f64,

    /// Per-participant breakdown, keyed by participant id.
    pub participant_totals: HashMap<String, ParticipantTotal>,
}

// =============================================================================
// The Engine
// =============================================================================

/// Computes the per-participant breakdown of a bill.
///
/// Pure and total for structurally valid bills: no I/O, no clock, no
/// randomness, and repeat calls on the same bill value produce bit-identical
/// results. Bills with fewer than two participants (or none) are accepted;
/// only the API boundary insists on two.
///
/// ## Errors
/// The engine does not validate bills (producers do), but it refuses to
/// paper over dangling references:
/// - [`CoreError::UnknownItemParticipant`] when an item is assigned to an id
///   with no participant entry
/// - [`CoreError::HostNotFound`] when a `Host`-split extra is applied and
///   `host_id` has no participant entry
///
/// Either way no partial result escapes; callers get the full breakdown or
/// an error.
pub fn calculate(bill: &Bill) -> CoreResult<BillCalculation> {
    let mut totals: HashMap<String, ParticipantTotal> = bill
        .participants
        .iter()
        .map(|p| (p.id.clone(), ParticipantTotal::default()))
        .collect();

    // Pass 1: allocate item costs to their assignees, equally per head.
    for item in &bill.items {
        if !item.is_assigned() {
            // Not yet billed to anyone; the item stays on the bill for
            // display but its cost reaches no subtotal.
            continue;
        }

        let share = item.line_total() / item.participant_ids.len() as f64;
        for participant_id in &item.participant_ids {
            let entry = totals.get_mut(participant_id).ok_or_else(|| {
                CoreError::UnknownItemParticipant {
                    item_name: item.name.clone(),
                    participant_id: participant_id.clone(),
                }
            })?;
            entry.subtotal += share;
            entry.items.push(ItemShare {
                name: item.name.clone(),
                share,
            });
        }
    }

    // Summed in participant order so the float result is reproducible.
    let bill_subtotal: f64 = bill
        .participants
        .iter()
        .map(|p| totals.get(&p.id).map_or(0.0, |t| t.subtotal))
        .sum();

    // Pass 2: resolve and distribute extras, one at a time, in bill order.
    let mut extras_total = 0.0;
    for extra in &bill.extras {
        let amount = extra.resolve_amount(bill_subtotal);
        extras_total += amount;

        match extra.split_mode {
            ExtraSplitMode::Equally => {
                if !bill.participants.is_empty() {
                    let share = amount / bill.participants.len() as f64;
                    for entry in totals.values_mut() {
                        entry.extras += share;
                    }
                }
            }
            ExtraSplitMode::Proportionally => {
                // No basis for proportion with zero spend: the amount stays
                // in extras_total but is distributed to no one.
                if bill_subtotal > 0.0 {
                    for entry in totals.values_mut() {
                        let proportion = entry.subtotal / bill_subtotal;
                        entry.extras += amount * proportion;
                    }
                }
            }
            ExtraSplitMode::Host => {
                let entry = totals.get_mut(&bill.host_id).ok_or_else(|| {
                    CoreError::HostNotFound {
                        host_id: bill.host_id.clone(),
                    }
                })?;
                entry.extras += amount;
            }
        }
    }

    // Pass 3: finalize.
    for entry in totals.values_mut() {
        entry.total = entry.subtotal + entry.extras;
    }

    Ok(BillCalculation {
        subtotal: bill_subtotal,
        extras_total,
        grand_total: bill_subtotal + extras_total,
        participant_totals: totals,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extra, ExtraMode, ExtraType, Item, Participant};
    use chrono::Utc;

    const EPS: f64 = 1e-6;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn participant(id: &str, name: &str) -> Participant {
        Participant {
            id: id.to_string(),
            name: name.to_string(),
            avatar_color: "#f94144".to_string(),
        }
    }

    fn item(name: &str, quantity: i64, price: f64, assignees: &[&str]) -> Item {
        Item {
            id: format!("item-{name}"),
            name: name.to_string(),
            quantity,
            price,
            participant_ids: assignees.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn extra(extra_type: ExtraType, mode: ExtraMode, value: f64, split_mode: ExtraSplitMode) -> Extra {
        Extra {
            id: "extra-1".to_string(),
            extra_type,
            mode,
            value,
            split_mode,
        }
    }

    fn bill(participants: Vec<Participant>, items: Vec<Item>, extras: Vec<Extra>) -> Bill {
        let host_id = participants.first().map(|p| p.id.clone()).unwrap_or_default();
        Bill {
            id: "bill-1".to_string(),
            title: "Dinner".to_string(),
            date: Utc::now(),
            host_id,
            participants,
            items,
            extras,
            currency: "IDR".to_string(),
        }
    }

    /// Pizza 100 000 shared by A and B, no extras.
    #[test]
    fn test_single_item_split_two_ways() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![],
        );
        let calc = calculate(&b).unwrap();

        assert!(approx(calc.subtotal, 100000.0));
        assert!(approx(calc.grand_total, 100000.0));
        assert!(approx(calc.participant_totals["A"].subtotal, 50000.0));
        assert!(approx(calc.participant_totals["B"].subtotal, 50000.0));
        assert_eq!(calc.participant_totals["A"].items.len(), 1);
        assert_eq!(calc.participant_totals["A"].items[0].name, "Pizza");
    }

    /// Same pizza plus a 10% tax split proportionally.
    #[test]
    fn test_proportional_percentage_tax() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![extra(
                ExtraType::Tax,
                ExtraMode::Percentage,
                10.0,
                ExtraSplitMode::Proportionally,
            )],
        );
        let calc = calculate(&b).unwrap();

        assert!(approx(calc.extras_total, 10000.0));
        assert!(approx(calc.participant_totals["A"].extras, 5000.0));
        assert!(approx(calc.participant_totals["B"].extras, 5000.0));
        assert!(approx(calc.participant_totals["A"].total, 55000.0));
        assert!(approx(calc.participant_totals["B"].total, 55000.0));
        assert!(approx(calc.grand_total, 110000.0));
    }

    /// Fixed 20 000 discount split equally on the same base bill.
    #[test]
    fn test_fixed_discount_split_equally() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![extra(
                ExtraType::Discount,
                ExtraMode::Fixed,
                20000.0,
                ExtraSplitMode::Equally,
            )],
        );
        let calc = calculate(&b).unwrap();

        assert!(approx(calc.extras_total, -20000.0));
        assert!(approx(calc.participant_totals["A"].extras, -10000.0));
        assert!(approx(calc.participant_totals["B"].extras, -10000.0));
        assert!(approx(calc.grand_total, 80000.0));
    }

    /// Host absorbs a fixed service charge.
    #[test]
    fn test_host_absorbs_service_charge() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![extra(
                ExtraType::Service,
                ExtraMode::Fixed,
                5000.0,
                ExtraSplitMode::Host,
            )],
        );
        let calc = calculate(&b).unwrap();

        assert!(approx(calc.participant_totals["A"].extras, 5000.0));
        assert!(approx(calc.participant_totals["B"].extras, 0.0));
    }

    #[test]
    fn test_item_share_is_line_total_over_assignee_count() {
        let b = bill(
            vec![
                participant("A", "Adi"),
                participant("B", "Budi"),
                participant("C", "Cici"),
            ],
            vec![item("Sate", 4, 25000.0, &["A", "B", "C"])],
            vec![],
        );
        let calc = calculate(&b).unwrap();

        let share = 100000.0 / 3.0;
        for id in ["A", "B", "C"] {
            assert!(approx(calc.participant_totals[id].subtotal, share));
        }
        // Shares reconstruct the line total up to float rounding
        let reconstructed: f64 = ["A", "B", "C"]
            .iter()
            .map(|id| calc.participant_totals[*id].subtotal)
            .sum();
        assert!(approx(reconstructed, 100000.0));
    }

    #[test]
    fn test_unassigned_item_money_disappears() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![
                item("Pizza", 1, 100000.0, &["A", "B"]),
                item("Mystery", 1, 40000.0, &[]),
            ],
            vec![],
        );
        let calc = calculate(&b).unwrap();

        // The unassigned item is excluded from every subtotal...
        assert!(approx(calc.subtotal, 100000.0));
        assert!(approx(calc.grand_total, 100000.0));
        // ...and from every per-person breakdown.
        assert_eq!(calc.participant_totals["A"].items.len(), 1);
        assert_eq!(calc.participant_totals["B"].items.len(), 1);
    }

    #[test]
    fn test_equal_split_extra_covers_amount() {
        let b = bill(
            vec![
                participant("A", "Adi"),
                participant("B", "Budi"),
                participant("C", "Cici"),
            ],
            vec![item("Pizza", 1, 90000.0, &["A"])],
            vec![extra(
                ExtraType::Delivery,
                ExtraMode::Fixed,
                10000.0,
                ExtraSplitMode::Equally,
            )],
        );
        let calc = calculate(&b).unwrap();

        let sum: f64 = ["A", "B", "C"]
            .iter()
            .map(|id| calc.participant_totals[*id].extras)
            .sum();
        assert!(approx(sum, 10000.0));
        assert!(approx(calc.participant_totals["B"].extras, 10000.0 / 3.0));
    }

    #[test]
    fn test_proportional_over_zero_subtotal_distributes_to_no_one() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Mystery", 1, 40000.0, &[])],
            vec![extra(
                ExtraType::Service,
                ExtraMode::Fixed,
                5000.0,
                ExtraSplitMode::Proportionally,
            )],
        );
        let calc = calculate(&b).unwrap();

        // Counted at the bill level, distributed to nobody. The resulting
        // gap between grand_total and the participant sum is intentional.
        assert!(approx(calc.extras_total, 5000.0));
        assert!(approx(calc.participant_totals["A"].extras, 0.0));
        assert!(approx(calc.participant_totals["B"].extras, 0.0));
        assert!(approx(calc.grand_total, 5000.0));

        let participant_sum: f64 = ["A", "B"]
            .iter()
            .map(|id| calc.participant_totals[*id].total)
            .sum();
        assert!(approx(participant_sum, 0.0));
    }

    #[test]
    fn test_percentage_discount_negates() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![extra(
                ExtraType::Discount,
                ExtraMode::Percentage,
                25.0,
                ExtraSplitMode::Proportionally,
            )],
        );
        let calc = calculate(&b).unwrap();

        assert!(calc.extras_total < 0.0);
        assert!(approx(calc.extras_total, -25000.0));
        assert!(approx(calc.grand_total, 75000.0));
    }

    #[test]
    fn test_extras_apply_in_bill_order_independently() {
        // Percentage extras always resolve against the ITEM subtotal, not a
        // running total, so order only affects presentation.
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![
                extra(ExtraType::Tax, ExtraMode::Percentage, 10.0, ExtraSplitMode::Equally),
                extra(ExtraType::Service, ExtraMode::Percentage, 5.0, ExtraSplitMode::Equally),
            ],
        );
        let calc = calculate(&b).unwrap();
        assert!(approx(calc.extras_total, 15000.0));
        assert!(approx(calc.participant_totals["A"].extras, 7500.0));
    }

    #[test]
    fn test_unknown_item_participant_fails_loudly() {
        let b = bill(
            vec![participant("A", "Adi")],
            vec![item("Pizza", 1, 100000.0, &["A", "GHOST"])],
            vec![],
        );
        let err = calculate(&b).unwrap_err();
        match err {
            CoreError::UnknownItemParticipant {
                item_name,
                participant_id,
            } => {
                assert_eq!(item_name, "Pizza");
                assert_eq!(participant_id, "GHOST");
            }
            other => panic!("expected UnknownItemParticipant, got {other:?}"),
        }
    }

    #[test]
    fn test_host_extra_with_missing_host_fails_loudly() {
        let mut b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![extra(
                ExtraType::Service,
                ExtraMode::Fixed,
                5000.0,
                ExtraSplitMode::Host,
            )],
        );
        b.host_id = "GHOST".to_string();

        let err = calculate(&b).unwrap_err();
        assert!(matches!(err, CoreError::HostNotFound { host_id } if host_id == "GHOST"));
    }

    #[test]
    fn test_missing_host_is_fine_without_host_extras() {
        // The engine only resolves host_id when a Host split needs it.
        let mut b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![item("Pizza", 1, 100000.0, &["A", "B"])],
            vec![],
        );
        b.host_id = "GHOST".to_string();
        assert!(calculate(&b).is_ok());
    }

    #[test]
    fn test_empty_bill() {
        let b = bill(vec![], vec![], vec![]);
        let calc = calculate(&b).unwrap();
        assert_eq!(calc.subtotal, 0.0);
        assert_eq!(calc.grand_total, 0.0);
        assert!(calc.participant_totals.is_empty());
    }

    #[test]
    fn test_item_shares_preserve_processing_order() {
        let b = bill(
            vec![participant("A", "Adi"), participant("B", "Budi")],
            vec![
                item("Pizza", 1, 100000.0, &["A", "B"]),
                item("Es Teh", 2, 8000.0, &["A"]),
                item("Sate", 1, 30000.0, &["A", "B"]),
            ],
            vec![],
        );
        let calc = calculate(&b).unwrap();

        let names: Vec<&str> = calc.participant_totals["A"]
            .items
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Pizza", "Es Teh", "Sate"]);
    }

    #[test]
    fn test_repeat_calls_are_bit_identical() {
        let b = bill(
            vec![
                participant("A", "Adi"),
                participant("B", "Budi"),
                participant("C", "Cici"),
            ],
            vec![
                item("Pizza", 1, 100000.0, &["A", "B", "C"]),
                item("Es Teh", 3, 8000.0, &["B", "C"]),
            ],
            vec![
                extra(ExtraType::Tax, ExtraMode::Percentage, 11.0, ExtraSplitMode::Proportionally),
                extra(ExtraType::Discount, ExtraMode::Fixed, 15000.0, ExtraSplitMode::Equally),
            ],
        );

        let first = calculate(&b).unwrap();
        let second = calculate(&b).unwrap();
        assert_eq!(first, second);
        // Bit-identical, not merely approximately equal
        assert_eq!(
            first.participant_totals["B"].total.to_bits(),
            second.participant_totals["B"].total.to_bits()
        );
    }
}
