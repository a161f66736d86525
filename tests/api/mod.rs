mod file_tests;
mod health_tests;
mod room_tests;
mod voice_tests;
