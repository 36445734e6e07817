pub mod audit;
pub mod backup;
pub mod dispatch;
pub mod order;
pub mod restore;
pub mod serve;
