pub mod lesson_activity;
