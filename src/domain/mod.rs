// Domain layer: 模型、地理計算與對外協作者的介面（ports）。不依賴任何具體儲存實作。

pub mod geo;
pub mod model;
pub mod ports;
