mod test_connection_negotiation;
mod test_session_failures;
mod test_third_client_rejected;
