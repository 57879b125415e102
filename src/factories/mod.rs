pub mod message_factory;
