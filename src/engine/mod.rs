//! The detection engine: decision logic, control loop, and hand-off channels

pub mod channel;
pub mod command;
pub mod decision;
pub mod worker;

pub use channel::{
    result_channel, result_channel_with_capacity, AreaUpdate, LoopMessage, ResultConsumer,
    ResultPublisher,
};
pub use command::{command_queue, Command, CommandReceiver, CommandSender};
pub use decision::DecisionEngine;
pub use worker::{DetectionLoop, LoopHandle};
