use std::time::Instant;

use crate::model::link::LinkTable;
use crate::model::message::Message;
use crate::model::routing::RoutingTable;

/// What the dispatcher/forwarder decided should happen with one inbound
/// message: zero or more outbound sends, and an optional value to hand to
/// local output.
#[derive(Debug, Default, PartialEq)]
pub struct DispatchOutcome {
    pub outbound: Vec<(String, Message)>,
    pub delivered: Option<Delivered>,
}

#[derive(Debug, PartialEq)]
pub enum Delivered {
    Data(String),
    Control { reason: String, original: Message },
}

impl DispatchOutcome {
    fn send(to: String, message: Message) -> Self {
        Self {
            outbound: vec![(to, message)],
            delivered: None,
        }
    }

    fn nothing() -> Self {
        Self::default()
    }
}

/// Classifies one inbound datagram and routes it to the right handler
/// (spec §4.4). `now` drives the link keep-alive refresh on `update`.
pub fn dispatch(
    links: &mut LinkTable,
    rt: &mut RoutingTable,
    self_address: &str,
    message: Message,
    now: Instant,
) -> DispatchOutcome {
    match message {
        Message::Update {
            source, distances, ..
        } => {
            links.touch(&source, now);
            if let Some(weight) = links.weight(&source) {
                rt.learn_neighbor_vector(&source, u64::from(weight), &distances);
            }
            DispatchOutcome::nothing()
        }
        Message::Data {
            source,
            destination,
            payload,
        } => {
            if destination == self_address {
                DispatchOutcome {
                    outbound: Vec::new(),
                    delivered: Some(Delivered::Data(payload)),
                }
            } else {
                forward_or_notify(
                    rt,
                    self_address,
                    Message::Data {
                        source,
                        destination,
                        payload,
                    },
                )
            }
        }
        Message::Trace {
            source,
            destination,
            mut routers,
        } => {
            routers.push(self_address.to_string());
            if destination == self_address {
                let trace = Message::Trace {
                    source: source.clone(),
                    destination,
                    routers,
                };
                let payload = serde_json::to_string(&trace)
                    .unwrap_or_else(|_| "{}".to_string());
                let reply = Message::Data {
                    source: self_address.to_string(),
                    destination: source,
                    payload,
                };
                forward_or_notify(rt, self_address, reply)
            } else {
                forward_or_notify(
                    rt,
                    self_address,
                    Message::Trace {
                        source,
                        destination,
                        routers,
                    },
                )
            }
        }
        Message::Control {
            source,
            destination,
            reason,
            original,
        } => {
            if destination == self_address {
                DispatchOutcome {
                    outbound: Vec::new(),
                    delivered: Some(Delivered::Control {
                        reason,
                        original: *original,
                    }),
                }
            } else {
                forward_or_notify(
                    rt,
                    self_address,
                    Message::Control {
                        source,
                        destination,
                        reason,
                        original,
                    },
                )
            }
        }
    }
}

/// Looks up a next hop for `m.destination` and transmits it there. If no
/// route exists, replies with a `control/unreachable` toward `m.source`
/// instead; if that too is unroutable, the message is dropped silently
/// (loop prevention — spec §4.5, §7).
pub fn forward_or_notify(rt: &RoutingTable, self_address: &str, message: Message) -> DispatchOutcome {
    let destination = message.destination().to_string();
    if let Some(next_hop) = rt.next_hop(&destination) {
        return DispatchOutcome::send(next_hop, message);
    }

    let source = message.source().to_string();
    let control = Message::Control {
        source: self_address.to_string(),
        destination: source.clone(),
        reason: "unreachable".to_string(),
        original: Box::new(message),
    };
    match rt.next_hop(&source) {
        Some(next_hop) => DispatchOutcome::send(next_hop, control),
        None => DispatchOutcome::nothing(),
    }
}
