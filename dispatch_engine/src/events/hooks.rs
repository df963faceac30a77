use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, RideAssignedEvent, RideCompletedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub ride_assigned_producer: Vec<EventProducer<RideAssignedEvent>>,
    pub ride_completed_producer: Vec<EventProducer<RideCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_ride_assigned: Option<EventHandler<RideAssignedEvent>>,
    pub on_ride_completed: Option<EventHandler<RideCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_ride_assigned = hooks.on_ride_assigned.map(|f| EventHandler::new(buffer_size, f));
        let on_ride_completed = hooks.on_ride_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_ride_assigned, on_ride_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_ride_assigned {
            result.ride_assigned_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_ride_completed {
            result.ride_completed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_ride_assigned {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_ride_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_ride_assigned: Option<Handler<RideAssignedEvent>>,
    pub on_ride_completed: Option<Handler<RideCompletedEvent>>,
}

impl EventHooks {
    pub fn on_ride_assigned<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RideAssignedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_ride_assigned = Some(Arc::new(f));
        self
    }

    pub fn on_ride_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RideCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_ride_completed = Some(Arc::new(f));
        self
    }
}
