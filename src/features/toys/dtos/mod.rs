mod toy_dto;

pub use toy_dto::{
    category_options, image_errors, ToyForm, ToySummaryView, ToyView, MAX_IMAGE_SIZE,
};
