// 掃描結果的資料模型，以及查詢服務與設定的介面

pub mod model;
pub mod ports;
