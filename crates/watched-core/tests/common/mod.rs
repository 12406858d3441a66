pub mod cgi_server;
