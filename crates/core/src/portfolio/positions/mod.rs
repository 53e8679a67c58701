mod positions_model;


pub use positions_model::{
    is_quantity_significant, ConsumedLot, DisposalMethod, DisposalResult, HistoryEntry, Lot,
    Position,
};
