use trustflow_core::{EngineError, EngineResult};

use crate::models::{Actor, Arbitration, EscrowEvent, EscrowStatus, Order};

/// Lifecycle events accepted by the escrow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowCommand {
    /// Buyer or automated confirmation that goods arrived.
    ConfirmDelivery,
    /// Buyer or seller of the order opens a dispute.
    RaiseDispute,
    /// Arbitration decision on a disputed order.
    ResolveDispute(Arbitration),
    /// Seller cancels before the shipped milestone is recorded.
    CancelBeforeShipment,
}

impl EscrowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EscrowCommand::ConfirmDelivery => "CONFIRM_DELIVERY",
            EscrowCommand::RaiseDispute => "RAISE_DISPUTE",
            EscrowCommand::ResolveDispute(_) => "RESOLVE_DISPUTE",
            EscrowCommand::CancelBeforeShipment => "CANCEL_BEFORE_SHIPMENT",
        }
    }
}

/// Owns the escrow lifecycle of a single order's funds.
///
/// Transition table:
///   Held     --ConfirmDelivery (buyer | system)------> Released
///   Held     --RaiseDispute (buyer | seller)---------> Disputed
///   Held     --CancelBeforeShipment (seller, unshipped)-> Refunded
///   Disputed --ResolveDispute(SellerFavor) (arbiter)--> Released
///   Disputed --ResolveDispute(BuyerFavor) (arbiter)---> Refunded
///
/// Anything else fails with `InvalidTransition` and leaves the order
/// untouched. Released and Refunded are terminal.
pub struct EscrowStateMachine;

impl EscrowStateMachine {
    pub fn apply(order: &mut Order, command: EscrowCommand, actor: Actor) -> EngineResult<EscrowEvent> {
        let from = order.escrow_status;
        let to = Self::target(order, from, command, actor)?;

        order.escrow_status = to;
        let at = order.append_history(to, actor);
        tracing::info!(order_id = %order.id, %from, %to, event = command.name(), "Escrow transition");

        Ok(EscrowEvent {
            order_id: order.id,
            from,
            to,
            actor,
            at,
        })
    }

    fn target(
        order: &Order,
        from: EscrowStatus,
        command: EscrowCommand,
        actor: Actor,
    ) -> EngineResult<EscrowStatus> {
        let rejected = || {
            Err(EngineError::InvalidTransition {
                from: from.to_string(),
                event: command.name().to_string(),
            })
        };

        match (from, command) {
            (EscrowStatus::Held, EscrowCommand::ConfirmDelivery) => match actor {
                Actor::Buyer(id) if id == order.buyer_id => Ok(EscrowStatus::Released),
                Actor::System => Ok(EscrowStatus::Released),
                _ => rejected(),
            },
            (EscrowStatus::Held, EscrowCommand::RaiseDispute) => match actor {
                Actor::Buyer(id) if id == order.buyer_id => Ok(EscrowStatus::Disputed),
                Actor::Seller(id) if id == order.seller_id => Ok(EscrowStatus::Disputed),
                _ => rejected(),
            },
            (EscrowStatus::Held, EscrowCommand::CancelBeforeShipment) => match actor {
                Actor::Seller(id) if id == order.seller_id && !order.is_shipped() => {
                    Ok(EscrowStatus::Refunded)
                }
                _ => rejected(),
            },
            (EscrowStatus::Disputed, EscrowCommand::ResolveDispute(outcome)) => match actor {
                Actor::Arbiter(_) => Ok(match outcome {
                    Arbitration::SellerFavor => EscrowStatus::Released,
                    Arbitration::BuyerFavor => EscrowStatus::Refunded,
                }),
                _ => rejected(),
            },
            _ => rejected(),
        }
    }
}
