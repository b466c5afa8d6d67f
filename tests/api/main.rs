mod postgres;
mod submit;
