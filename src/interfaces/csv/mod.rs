pub mod order_reader;
pub mod verdict_writer;
