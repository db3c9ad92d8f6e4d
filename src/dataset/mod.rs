pub mod coco;
pub mod coco_to_yolo;
pub mod pairing;
