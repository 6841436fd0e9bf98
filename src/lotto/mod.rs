pub mod audit;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod game;
pub mod http;
pub mod ingest;
pub mod jackpot;
pub mod live;
pub mod normalize;
pub mod paths;
pub mod pipeline;
pub mod record;
pub mod util;
pub mod warn;
